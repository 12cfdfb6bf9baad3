//! Scanline rendering functions.
//!
//! Drivers that move coverage or generated colors into a pixel format:
//!
//! - `render_scanlines_aa_solid()` blends rasterized polygons in one color
//!   (watermark text into a tile).
//! - `blend_rect_spans()` / `copy_rect_spans()` run a [`SpanGenerator`] over
//!   an axis-aligned rectangle (pattern fill, scaled image draw).

use crate::color::Rgba8;
use crate::pixfmt_rgba::PixelFormat;
use crate::rasterizer_scanline_aa::RasterizerScanlineAa;

// ============================================================================
// render_scanlines_aa_solid — the main rendering driver
// ============================================================================

/// Render all scanlines from the rasterizer as a solid color.
///
/// Each row is split into runs of non-zero coverage and every run is
/// blended with one `blend_solid_hspan` call.
pub fn render_scanlines_aa_solid<PF>(ras: &mut RasterizerScanlineAa, pf: &mut PF, color: &Rgba8)
where
    PF: PixelFormat<ColorType = Rgba8>,
{
    ras.close_polygon();
    let width = ras.width() as usize;
    let mut covers = vec![0; width];

    for y in ras.scanline_range() {
        if !ras.sweep_scanline(y, &mut covers) {
            continue;
        }
        let mut x = 0;
        while x < width {
            if covers[x] == 0 {
                x += 1;
                continue;
            }
            let start = x;
            while x < width && covers[x] != 0 {
                x += 1;
            }
            pf.blend_solid_hspan(start as i32, y as i32, color, &covers[start..x]);
        }
    }
}

// ============================================================================
// SpanGenerator trait
// ============================================================================

/// Trait for span generators that produce per-pixel colors.
///
/// Span generators fill a color array for each horizontal span; the
/// driver then blends or copies that array into the output buffer.
pub trait SpanGenerator {
    type Color;

    /// Called once before rendering begins.
    fn prepare(&mut self);

    /// Fill `span` with colors for the pixels starting at (x, y).
    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32);
}

/// Blend generated spans over the rectangle `[x, x + width) x [y, y + height)`.
pub fn blend_rect_spans<PF, SG>(
    pf: &mut PF,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    span_gen: &mut SG,
)
where
    PF: PixelFormat<ColorType = Rgba8>,
    SG: SpanGenerator<Color = Rgba8>,
{
    let mut span = vec![Rgba8::TRANSPARENT; width as usize];
    span_gen.prepare();
    for row in 0..height as i32 {
        span_gen.generate(&mut span, x, y + row);
        pf.blend_color_hspan(x, y + row, &span, crate::basics::COVER_FULL);
    }
}

/// Copy generated spans into the rectangle, replacing what was there.
pub fn copy_rect_spans<PF, SG>(
    pf: &mut PF,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    span_gen: &mut SG,
)
where
    PF: PixelFormat<ColorType = Rgba8>,
    SG: SpanGenerator<Color = Rgba8>,
{
    let mut span = vec![Rgba8::TRANSPARENT; width as usize];
    span_gen.prepare();
    for row in 0..height as i32 {
        span_gen.generate(&mut span, x, y + row);
        pf.copy_color_hspan(x, y + row, &span);
    }
}

// ============================================================================
// Tests
// ============================================================================
