//! # agg-watermark
//!
//! Tiled text watermarks composited over photos, rendered with an
//! Anti-Grain Geometry style pipeline in pure Rust.
//!
//! Two components make up the engine:
//!
//! - [`TileRenderer`] turns a [`WatermarkConfig`] into one tile: the text is
//!   wrapped greedily against the tile width, rotated by `-θ` and
//!   rasterized with anti-aliasing into a transparent RGBA buffer.
//! - [`CompositeCanvas`] decodes a source image, scales it to its display
//!   size, and fills the tile as a repeating pattern on top. It tracks the
//!   load/draw/update lifecycle, reports resize/draw/error events and
//!   exports the result as PNG, JPEG, WebP or BMP.
//!
//! ## Architecture
//!
//! The tile goes through the classic pipeline stages:
//!
//! 1. **Vertex Source**: glyph outlines in a [`PathStorage`]
//! 2. **Coordinate Conversion**: [`TransAffine`] rotation, curve flattening
//! 3. **Scanline Rasterizer**: signed-area coverage per pixel
//! 4. **Renderer**: coverage blended into a [`PixfmtRgba32`]
//!
//! Compositing reuses the span generator stage: a bilinear image filter
//! draws the photo, and a repeating pattern span draws the tile over it.
//!
//! ```
//! use agg_watermark::{CompositeCanvas, WatermarkConfig};
//!
//! # fn main() -> agg_watermark::Result<()> {
//! let mut canvas = CompositeCanvas::with_defaults()?;
//! canvas.set_options(WatermarkConfig::new("CONFIDENTIAL").with_rotation(30.0))?;
//! assert_eq!(canvas.display_size(), (0, 0));
//! # Ok(())
//! # }
//! ```

// Foundation types & math
pub mod basics;
pub mod color;
pub mod error;

// Geometry
pub mod curves;
pub mod path_storage;
pub mod trans_affine;

// Rasterization & pixel formats
pub mod pixfmt_rgba;
pub mod rasterizer_scanline_aa;
pub mod renderer_scanline;
pub mod rendering_buffer;

// Span generators & image access
pub mod image_accessors;
pub mod span_image_filter_rgba;
pub mod span_interpolator_linear;
pub mod span_pattern_rgba;

// Text
pub mod glyph;
pub mod raster_font;
pub mod text_wrap;
#[cfg(feature = "font")]
pub mod font_engine;

// Watermark engine
pub mod composite_canvas;
pub mod events;
pub mod export;
pub mod source_image;
pub mod tile_renderer;
pub mod viewport;
pub mod watermark_config;

pub use color::Rgba8;
pub use composite_canvas::{CanvasOptions, CanvasState, CompositeCanvas, LoadOutcome};
pub use error::{ConfigError, DecodeError, ExportError, Result, WatermarkError};
pub use events::{CanvasEvents, EventCallbacks, NoEvents};
pub use export::{Blob, ExportFormat};
pub use path_storage::PathStorage;
pub use pixfmt_rgba::PixfmtRgba32;
pub use source_image::{LoadLimits, SourceImage, SourceRef};
pub use tile_renderer::{TileBuffer, TileRenderer};
pub use trans_affine::TransAffine;
pub use viewport::DisplayPolicy;
pub use watermark_config::WatermarkConfig;

#[cfg(feature = "font")]
pub use font_engine::FontEngine;
