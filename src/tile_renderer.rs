//! Watermark tile rendering.
//!
//! A tile is one rectangular cell of the watermark pattern. The text is
//! laid out unrotated, wrapped greedily against the tile width, and then
//! rasterized through a single `-θ` rotation so the repeated pattern reads
//! as text tilted by `+θ`.
//!
//! The buffer is `ceil(hypot(w, h))` wide and `ceil(h)` tall. The diagonal
//! width is the largest horizontal extent a `w × h` rectangle can reach
//! under rotation, so rotated text is never clipped horizontally.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::basics::deg2rad;
use crate::error::Result;
use crate::glyph::GlyphSource;
use crate::path_storage::PathStorage;
use crate::pixfmt_rgba::PixfmtRgba32;
use crate::raster_font::RasterFont;
use crate::rasterizer_scanline_aa::RasterizerScanlineAa;
use crate::renderer_scanline::render_scanlines_aa_solid;
use crate::rendering_buffer::RenderingBuffer;
use crate::text_wrap::wrap_text;
use crate::trans_affine::TransAffine;
use crate::watermark_config::WatermarkConfig;

/// Line pitch as a multiple of the font size.
pub const LINE_PITCH: f64 = 1.4;

/// Left margin added to the anchor x.
pub const MARGIN_X: f64 = 10.0;

/// Top margin added to the anchor y, below one font size.
pub const MARGIN_Y: f64 = 20.0;

// ============================================================================
// Geometry
// ============================================================================

/// Pixel dimensions of the tile buffer for a logical `width × height` tile.
pub fn tile_extent(width: f64, height: f64) -> (u32, u32) {
    (width.hypot(height).ceil() as u32, height.ceil() as u32)
}

/// Text anchor inside the rotated frame.
///
/// `Y = floor(sin θ · width)` and `X = -floor(Y / tan(90° - θ))`. Both are
/// whole pixels so the glyph grid does not drift with small angle changes.
pub fn rotated_anchor(rotation_degrees: f64, tile_width: f64) -> (f64, f64) {
    let y = (deg2rad(rotation_degrees).sin() * tile_width).floor();
    let x = -(y / deg2rad(90.0 - rotation_degrees).tan()).floor();
    // Avoid a negative zero leaking into the layout at 0°.
    (x + 0.0, y)
}

// ============================================================================
// TileBuffer
// ============================================================================

/// One line of text as placed in the unrotated text frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Where the text went inside a tile, before rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayout {
    /// Rotated-frame anchor `(X, Y)`.
    pub anchor: (f64, f64),
    /// Baseline start of the first line.
    pub start: (f64, f64),
    pub line_height: f64,
    pub lines: Vec<PlacedLine>,
}

/// A rendered tile: RGBA pixels plus the layout that produced them.
///
/// Read-only once built; a config change produces a new one.
#[derive(Debug, Clone)]
pub struct TileBuffer {
    pixels: RenderingBuffer,
    layout: TileLayout,
}

impl TileBuffer {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RenderingBuffer {
        &self.pixels
    }

    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    pub fn into_pixels(self) -> RenderingBuffer {
        self.pixels
    }
}

// ============================================================================
// TileRenderer
// ============================================================================

/// Renders watermark tiles with a given glyph source.
///
/// Stateless apart from the glyph source, so the same renderer can be
/// shared and called with any config.
#[derive(Clone)]
pub struct TileRenderer {
    glyphs: Arc<dyn GlyphSource>,
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::with_glyphs(Arc::new(RasterFont::new()))
    }
}

impl std::fmt::Debug for TileRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileRenderer").finish_non_exhaustive()
    }
}

impl TileRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyphs(glyphs: Arc<dyn GlyphSource>) -> Self {
        Self { glyphs }
    }

    pub fn glyphs(&self) -> &dyn GlyphSource {
        self.glyphs.as_ref()
    }

    /// Distinct characters of `text` the glyph source has no glyph for, in
    /// order of first appearance. The built-in font covers printable ASCII
    /// only, so CJK text (the default included) comes back here and renders
    /// as boxes unless a TrueType font is supplied.
    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        let mut missing = Vec::new();
        for ch in text.chars() {
            if !self.glyphs.has_glyph(ch) && !missing.contains(&ch) {
                missing.push(ch);
            }
        }
        missing
    }

    /// Lay out the text of `config` without rasterizing it.
    pub fn layout(&self, config: &WatermarkConfig) -> TileLayout {
        let font_size = config.font_size;
        let anchor = rotated_anchor(config.rotation_degrees, config.tile_width);
        let start = (anchor.0 + MARGIN_X, anchor.1 + font_size + MARGIN_Y);
        let line_height = font_size * LINE_PITCH;

        let lines = wrap_text(
            &config.text,
            config.tile_width,
            start.0,
            start.1,
            line_height,
            |ch| self.glyphs.advance(ch, font_size),
        )
        .into_iter()
        .map(|l| PlacedLine {
            text: l.text.to_string(),
            x: l.x,
            y: l.y,
        })
        .collect();

        TileLayout {
            anchor,
            start,
            line_height,
            lines,
        }
    }

    /// Render one tile for `config`.
    ///
    /// Fails with a config error when `config` does not validate.
    /// Identical configs always give identical pixels.
    pub fn render_tile(&self, config: &WatermarkConfig) -> Result<TileBuffer> {
        config.validate()?;

        let (width, height) = tile_extent(config.tile_width, config.tile_height);
        let layout = self.layout(config);
        let missing = self.missing_glyphs(&config.text);
        if !missing.is_empty() {
            warn!(
                count = missing.len(),
                first = %missing[0],
                "watermark text has characters without glyphs; drawing boxes"
            );
        }

        let mut path = PathStorage::new();
        for line in &layout.lines {
            self.glyphs
                .add_text(&line.text, config.font_size, line.x, line.y, &mut path);
        }

        let mut pixels = RenderingBuffer::new(width, height);
        if !path.is_empty() {
            let mtx = TransAffine::new_rotation(-deg2rad(config.rotation_degrees));
            let mut ras = RasterizerScanlineAa::new(width, height);
            ras.add_path(&path, &mtx);
            let mut pf = PixfmtRgba32::new(&mut pixels);
            render_scanlines_aa_solid(&mut ras, &mut pf, &config.fill_color);
        }

        debug!(
            width,
            height,
            lines = layout.lines.len(),
            rotation = config.rotation_degrees,
            "rendered watermark tile"
        );

        Ok(TileBuffer { pixels, layout })
    }
}

// ============================================================================
// Tests
// ============================================================================
