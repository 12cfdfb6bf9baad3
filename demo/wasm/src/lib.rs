use std::sync::Arc;

use agg_watermark::{
    CanvasEvents, CanvasOptions, CanvasState, CompositeCanvas, DisplayPolicy, FontEngine, Rgba8,
    TileRenderer, WatermarkConfig, WatermarkError,
};
use js_sys::Function;
use wasm_bindgen::prelude::*;

/// Forwards canvas events to JavaScript callbacks.
///
/// A throwing callback is ignored; the canvas keeps going.
#[derive(Default)]
struct JsEvents {
    resize: Option<Function>,
    draw_complete: Option<Function>,
    error: Option<Function>,
}

impl CanvasEvents for JsEvents {
    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(f) = &self.resize {
            let _ = f.call2(&JsValue::NULL, &width.into(), &height.into());
        }
    }

    fn on_draw_complete(&mut self) {
        if let Some(f) = &self.draw_complete {
            let _ = f.call0(&JsValue::NULL);
        }
    }

    fn on_error(&mut self, error: &WatermarkError) {
        if let Some(f) = &self.error {
            let _ = f.call1(&JsValue::NULL, &JsValue::from_str(&error.to_string()));
        }
    }
}

fn js_error(e: WatermarkError) -> JsError {
    JsError::new(&e.to_string())
}

/// Watermark canvas for the browser front end.
///
/// The TypeScript side hands over file bytes or a data URL, copies
/// `pixels()` into an `ImageData` after each draw, and calls `export` for
/// downloads.
#[wasm_bindgen]
pub struct WatermarkCanvas {
    inner: CompositeCanvas<JsEvents>,
    renderer: TileRenderer,
}

#[wasm_bindgen]
impl WatermarkCanvas {
    /// Build a canvas sized for a window `window_width` pixels wide.
    ///
    /// `font` is optional TTF/OTF data; the built-in raster font is used
    /// when it is empty.
    #[wasm_bindgen(constructor)]
    pub fn new(
        window_width: u32,
        font: &[u8],
        on_resize: Option<Function>,
        on_draw_complete: Option<Function>,
        on_error: Option<Function>,
    ) -> Result<WatermarkCanvas, JsError> {
        let renderer = if font.is_empty() {
            TileRenderer::new()
        } else {
            let engine = FontEngine::from_data(font.to_vec(), 0)
                .map_err(|e| js_error(e.into()))?;
            TileRenderer::with_glyphs(Arc::new(engine))
        };
        let events = JsEvents {
            resize: on_resize,
            draw_complete: on_draw_complete,
            error: on_error,
        };
        let options =
            CanvasOptions::default().with_display(DisplayPolicy::from_window_width(window_width));
        let inner =
            CompositeCanvas::with_renderer(options, renderer.clone(), events).map_err(js_error)?;
        Ok(WatermarkCanvas { inner, renderer })
    }

    /// Load encoded image bytes (PNG, JPEG, WebP, BMP or GIF).
    #[wasm_bindgen(js_name = loadBytes)]
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), JsError> {
        self.inner.load(bytes).map(|_| ()).map_err(js_error)
    }

    /// Load a `data:` URL, as produced by `FileReader.readAsDataURL`.
    #[wasm_bindgen(js_name = loadDataUrl)]
    pub fn load_data_url(&mut self, url: &str) -> Result<(), JsError> {
        if !url.starts_with("data:") {
            return Err(JsError::new("expected a data: URL"));
        }
        self.inner.load(url).map(|_| ()).map_err(js_error)
    }

    /// Replace the watermark. `fill_style` takes `#rgb`, `#rrggbb`,
    /// `#rrggbbaa` or `rgba(...)`.
    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(
        &mut self,
        text: &str,
        font_size: f64,
        fill_style: &str,
        width: f64,
        height: f64,
        rotate: f64,
    ) -> Result<(), JsError> {
        let fill_color: Rgba8 = fill_style
            .parse()
            .map_err(|e: agg_watermark::ConfigError| js_error(e.into()))?;
        let config = WatermarkConfig::new(text)
            .with_font_size(font_size)
            .with_fill_color(fill_color)
            .with_tile_size(width, height)
            .with_rotation(rotate);
        self.inner.set_options(config).map_err(js_error)
    }

    /// Characters of `text` the current font cannot draw. The built-in font
    /// covers printable ASCII only; pass a TTF to the constructor for others.
    #[wasm_bindgen(js_name = missingGlyphs)]
    pub fn missing_glyphs(&self, text: &str) -> String {
        self.renderer.missing_glyphs(text).into_iter().collect()
    }

    /// Encode the canvas. Unknown types fall back to PNG.
    pub fn export(&mut self, mime_type: &str, quality: Option<f64>) -> Result<Vec<u8>, JsError> {
        self.inner
            .export_blob(mime_type, quality)
            .map(|blob| blob.data)
            .map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.display_size().0
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.display_size().1
    }

    /// RGBA pixels of the composited canvas, `width * height * 4` bytes.
    /// Empty before the first draw.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner
            .pixels()
            .map(|rb| rb.data().to_vec())
            .unwrap_or_default()
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        match self.inner.state() {
            CanvasState::Empty => "empty",
            CanvasState::Loading => "loading",
            CanvasState::Ready => "ready",
            CanvasState::Error => "error",
            CanvasState::Destroyed => "destroyed",
        }
        .to_string()
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
    }
}

/// Get the library version string.
#[wasm_bindgen]
pub fn version() -> String {
    concat!("agg-watermark ", env!("CARGO_PKG_VERSION")).to_string()
}
