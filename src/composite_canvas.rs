//! The composited watermark canvas.
//!
//! [`CompositeCanvas`] owns the visible pixels. A load decodes a source
//! image, sizes the canvas to the image's display size, draws the image
//! scaled into it and then fills the watermark tile over the whole surface.
//! A config change re-renders the tile and re-composites over the cached,
//! already scaled image layer without decoding again.
//!
//! ```text
//!   Empty ──begin_load──► Loading ──ok──► Ready ◄──set_options──┐
//!     ▲                      │  ▲           │                    │
//!     │                      │  └─begin_load┴────────────────────┘
//!     └──────── Error ◄──────┘ failure with nothing drawn yet
//!   (any) ──destroy──► Destroyed
//! ```
//!
//! A failed or cancelled load over a drawn image goes back to `Ready` with
//! the previous pixels; a failed first load ends in `Error`, which behaves
//! like `Empty`.
//!
//! Loading is split in three so a caller can decode off the UI path:
//! [`CompositeCanvas::begin_load`] hands out a [`PendingLoad`] stamped with a
//! token, [`PendingLoad::decode`] does the slow part without touching the
//! canvas, and [`CompositeCanvas::complete_load`] applies the result. Only
//! the most recently requested load is ever drawn; older completions come
//! back as [`LoadOutcome::Superseded`].

use tracing::{debug, trace, warn};

use crate::error::{DecodeError, ExportError, Result, WatermarkError};
use crate::events::{CanvasEvents, NoEvents};
use crate::export::{encode, Blob, ExportFormat};
use crate::pixfmt_rgba::PixfmtRgba32;
use crate::rendering_buffer::RenderingBuffer;
use crate::source_image::{LoadLimits, SourceImage, SourceRef};
use crate::span_image_filter_rgba::draw_image_scaled;
use crate::span_pattern_rgba::fill_pattern;
use crate::tile_renderer::{TileBuffer, TileRenderer};
use crate::viewport::DisplayPolicy;
use crate::watermark_config::WatermarkConfig;

// ============================================================================
// State, options, load handles
// ============================================================================

/// Lifecycle state of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Empty,
    Loading,
    Ready,
    Error,
    Destroyed,
}

/// Everything a canvas is configured with up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasOptions {
    pub config: WatermarkConfig,
    pub display: DisplayPolicy,
    pub limits: LoadLimits,
}

impl CanvasOptions {
    pub fn with_config(mut self, config: WatermarkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_display(mut self, display: DisplayPolicy) -> Self {
        self.display = display;
        self
    }

    pub fn with_limits(mut self, limits: LoadLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadToken(u64);

/// A requested load that has not been decoded yet.
#[derive(Debug)]
pub struct PendingLoad {
    token: LoadToken,
    source: SourceRef,
    limits: LoadLimits,
}

impl PendingLoad {
    pub fn token(&self) -> LoadToken {
        self.token
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    /// Read and decode the source. Touches no canvas state.
    pub fn decode(self) -> DecodedLoad {
        let result = SourceImage::decode(&self.source, &self.limits);
        DecodedLoad {
            token: self.token,
            result,
        }
    }

    /// Finish with an image decoded elsewhere.
    pub fn resolve(self, result: std::result::Result<SourceImage, DecodeError>) -> DecodedLoad {
        DecodedLoad {
            token: self.token,
            result,
        }
    }
}

/// A decode result waiting to be applied with
/// [`CompositeCanvas::complete_load`].
#[derive(Debug)]
pub struct DecodedLoad {
    token: LoadToken,
    result: std::result::Result<SourceImage, DecodeError>,
}

impl DecodedLoad {
    pub fn token(&self) -> LoadToken {
        self.token
    }
}

/// What `complete_load` did with a decode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image was drawn at this display size.
    Drawn { width: u32, height: u32 },
    /// A newer load was requested meanwhile; this result was dropped.
    Superseded,
    /// The canvas was destroyed; this result was dropped.
    Discarded,
}

// ============================================================================
// CompositeCanvas
// ============================================================================

/// Image plus repeating watermark, composited into one RGBA surface.
pub struct CompositeCanvas<E: CanvasEvents = NoEvents> {
    state: CanvasState,
    renderer: TileRenderer,
    config: WatermarkConfig,
    display: DisplayPolicy,
    limits: LoadLimits,
    events: Option<E>,
    next_token: u64,
    latest: Option<LoadToken>,
    source: Option<SourceImage>,
    tile: Option<TileBuffer>,
    // Source image scaled to the display size, without the watermark.
    base: RenderingBuffer,
    canvas: RenderingBuffer,
    drawn: bool,
}

impl CompositeCanvas<NoEvents> {
    /// A canvas with default options and no event receiver.
    pub fn with_defaults() -> Result<Self> {
        Self::new(CanvasOptions::default(), NoEvents)
    }
}

impl<E: CanvasEvents> CompositeCanvas<E> {
    /// Build a canvas with the built-in glyph source.
    pub fn new(options: CanvasOptions, events: E) -> Result<Self> {
        Self::with_renderer(options, TileRenderer::default(), events)
    }

    /// Build a canvas that renders tiles with `renderer`.
    ///
    /// Fails when the initial config does not validate.
    pub fn with_renderer(
        options: CanvasOptions,
        renderer: TileRenderer,
        events: E,
    ) -> Result<Self> {
        let tile = renderer.render_tile(&options.config)?;
        Ok(Self {
            state: CanvasState::Empty,
            renderer,
            config: options.config,
            display: options.display,
            limits: options.limits,
            events: Some(events),
            next_token: 0,
            latest: None,
            source: None,
            tile: Some(tile),
            base: RenderingBuffer::new(0, 0),
            canvas: RenderingBuffer::new(0, 0),
            drawn: false,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> CanvasState {
        self.state
    }

    /// Current display size; `(0, 0)` until the first successful load.
    pub fn display_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Composited pixels, once something has been drawn.
    pub fn pixels(&self) -> Option<&RenderingBuffer> {
        self.drawn.then_some(&self.canvas)
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    /// The tile for the current config.
    pub fn tile(&self) -> Option<&TileBuffer> {
        self.tile.as_ref()
    }

    /// Natural size of the image currently drawn.
    pub fn source_size(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(SourceImage::natural_size)
    }

    pub fn display_policy(&self) -> DisplayPolicy {
        self.display
    }

    /// Change the viewport constraint. Applies from the next load on.
    pub fn set_display_policy(&mut self, display: DisplayPolicy) {
        if self.state != CanvasState::Destroyed {
            self.display = display;
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == CanvasState::Destroyed
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Decode `source` and draw it with the current watermark.
    pub fn load(&mut self, source: impl Into<SourceRef>) -> Result<LoadOutcome> {
        let pending = self.begin_load(source);
        self.complete_load(pending.decode())
    }

    /// Start a load. The returned handle supersedes every earlier one.
    ///
    /// Visible pixels stay as they are until the load completes. The canvas
    /// stays in [`CanvasState::Loading`] until the handle is passed back to
    /// [`complete_load`](Self::complete_load) or
    /// [`cancel_load`](Self::cancel_load); option changes made meanwhile are
    /// stored but not drawn.
    pub fn begin_load(&mut self, source: impl Into<SourceRef>) -> PendingLoad {
        let token = LoadToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        if self.state != CanvasState::Destroyed {
            self.latest = Some(token);
            self.state = CanvasState::Loading;
            trace!(token = token.0, "load requested");
        }
        PendingLoad {
            token,
            source: source.into(),
            limits: self.limits,
        }
    }

    /// Abandon the load identified by `token`.
    ///
    /// The canvas returns to `Ready` if an image is drawn, else to `Empty`.
    /// Returns `false` when `token` is not the pending load.
    pub fn cancel_load(&mut self, token: LoadToken) -> bool {
        if self.state == CanvasState::Destroyed || self.latest != Some(token) {
            return false;
        }
        self.latest = None;
        self.state = if self.drawn {
            CanvasState::Ready
        } else {
            CanvasState::Empty
        };
        trace!(token = token.0, "load cancelled");
        true
    }

    /// Apply a decode result.
    ///
    /// Stale results are dropped without touching anything. A decode error
    /// leaves the pixels as they were and is both reported to `on_error` and
    /// returned. The canvas goes back to `Ready` when an image is still
    /// drawn, or to [`CanvasState::Error`] when nothing is.
    pub fn complete_load(&mut self, decoded: DecodedLoad) -> Result<LoadOutcome> {
        if self.state == CanvasState::Destroyed {
            trace!(token = decoded.token.0, "load finished after destroy");
            return Ok(LoadOutcome::Discarded);
        }
        if self.latest != Some(decoded.token) {
            debug!(token = decoded.token.0, "dropping superseded load");
            return Ok(LoadOutcome::Superseded);
        }
        self.latest = None;

        let image = match decoded.result {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "image decode failed");
                self.settle_after_failure();
                return Err(self.report(e.into()));
            }
        };

        let (width, height) = self.display.display_size(image.width(), image.height());
        self.base.reallocate(width, height);
        draw_image_scaled(&mut self.base, image.pixels());
        self.source = Some(image);

        if self.tile.is_none() {
            match self.renderer.render_tile(&self.config) {
                Ok(tile) => self.tile = Some(tile),
                Err(e) => {
                    self.settle_after_failure();
                    return Err(self.report(e));
                }
            }
        }
        self.composite();
        self.state = CanvasState::Ready;

        debug!(width, height, "image drawn");
        if let Some(events) = self.events.as_mut() {
            events.on_resize(width, height);
            events.on_draw_complete();
        }
        Ok(LoadOutcome::Drawn { width, height })
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    /// Replace the watermark config.
    ///
    /// Once an image is drawn the pattern is refreshed immediately. Before
    /// that, or while a load is in flight, the config is only stored and
    /// takes effect with the next draw. An invalid config is rejected and
    /// the previous one stays in force.
    pub fn set_options(&mut self, config: WatermarkConfig) -> Result<()> {
        if self.state == CanvasState::Destroyed {
            return Ok(());
        }
        let tile = match self.renderer.render_tile(&config) {
            Ok(tile) => tile,
            Err(e) => return Err(self.report(e)),
        };
        self.config = config;
        self.tile = Some(tile);

        if self.state == CanvasState::Ready {
            self.composite();
            trace!("watermark refreshed");
            if let Some(events) = self.events.as_mut() {
                events.on_draw_complete();
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Encode the composited pixels.
    ///
    /// `mime_type` picks the format (PNG when unknown); `quality` in
    /// `0.0..=1.0` applies to JPEG.
    pub fn export_blob(&mut self, mime_type: &str, quality: Option<f64>) -> Result<Blob> {
        if self.state == CanvasState::Destroyed {
            return Err(ExportError::Destroyed.into());
        }
        if !self.drawn {
            return Err(self.report(ExportError::NothingDrawn.into()));
        }
        let format = ExportFormat::from_mime(mime_type, quality);
        match encode(&self.canvas, format) {
            Ok(blob) => {
                debug!(mime = %blob.mime_type, bytes = blob.len(), "canvas exported");
                Ok(blob)
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Release the image, the pixels and the event receiver.
    ///
    /// Safe to call in any state and more than once; later calls on the
    /// canvas do nothing.
    pub fn destroy(&mut self) {
        if self.state == CanvasState::Destroyed {
            return;
        }
        self.state = CanvasState::Destroyed;
        self.latest = None;
        self.source = None;
        self.tile = None;
        self.events = None;
        self.base.release();
        self.canvas.release();
        self.drawn = false;
        debug!("canvas destroyed");
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    /// Rebuild the visible pixels from the base layer and the tile.
    fn composite(&mut self) {
        self.canvas.copy_from(&self.base);
        if let Some(tile) = &self.tile {
            let mut pf = PixfmtRgba32::new(&mut self.canvas);
            fill_pattern(&mut pf, tile.pixels());
        }
        self.drawn = true;
    }

    fn settle_after_failure(&mut self) {
        self.state = if self.drawn {
            CanvasState::Ready
        } else {
            CanvasState::Error
        };
    }

    fn report(&mut self, error: WatermarkError) -> WatermarkError {
        if let Some(events) = self.events.as_mut() {
            events.on_error(&error);
        }
        error
    }
}

impl<E: CanvasEvents> std::fmt::Debug for CompositeCanvas<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeCanvas")
            .field("state", &self.state)
            .field("display_size", &self.display_size())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
