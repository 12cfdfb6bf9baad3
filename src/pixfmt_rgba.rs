//! RGBA pixel format with alpha blending.
//!
//! Pixel format that reads and writes RGBA32 pixels (4 bytes per pixel,
//! non-premultiplied alpha). Blending follows AGG's `blender_rgba_plain`:
//! destination alpha is honored, so a semi-transparent color drawn onto a
//! transparent tile keeps its own color instead of darkening towards black.
//!
//! Provides the `PixelFormat` trait and `PixfmtRgba32` concrete implementation.

use crate::basics::{CoverType, COVER_FULL};
use crate::color::Rgba8;
use crate::rendering_buffer::{RenderingBuffer, BPP};

// ============================================================================
// PixelFormat trait
// ============================================================================

/// Trait for pixel format renderers that can blend colors into a rendering buffer.
///
/// Spans that extend past the buffer are clipped; callers may pass
/// coordinates outside `[0, width) x [0, height)`.
pub trait PixelFormat {
    type ColorType;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Blend a single pixel at (x, y) with color `c` and coverage `cover`.
    fn blend_pixel(&mut self, x: i32, y: i32, c: &Self::ColorType, cover: CoverType);

    /// Blend a horizontal line of `len` pixels at (x, y) with uniform color and coverage.
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::ColorType, cover: CoverType);

    /// Blend a horizontal span with a solid color and per-pixel coverage.
    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Self::ColorType, covers: &[CoverType]);

    /// Blend a horizontal span of per-pixel colors with a uniform coverage.
    fn blend_color_hspan(&mut self, x: i32, y: i32, colors: &[Self::ColorType], cover: CoverType);

    /// Copy (overwrite) a horizontal span of per-pixel colors.
    fn copy_color_hspan(&mut self, x: i32, y: i32, colors: &[Self::ColorType]);

    /// Copy (overwrite) a horizontal line of `len` pixels with color `c`.
    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::ColorType);

    /// Copy (overwrite) a single pixel at (x, y) with color `c`.
    fn copy_pixel(&mut self, x: i32, y: i32, c: &Self::ColorType);

    /// Get the pixel color at (x, y). Outside the buffer this is the
    /// format's empty value.
    fn pixel(&self, x: i32, y: i32) -> Self::ColorType;
}

// ============================================================================
// PixfmtRgba32 — non-premultiplied RGBA, 8 bits per channel
// ============================================================================

/// Pixel format for non-premultiplied RGBA32 (4 bytes per pixel).
///
/// Component order: R=0, G=1, B=2, A=3.
pub struct PixfmtRgba32<'a> {
    rbuf: &'a mut RenderingBuffer,
}

impl<'a> PixfmtRgba32<'a> {
    pub fn new(rbuf: &'a mut RenderingBuffer) -> Self {
        Self { rbuf }
    }

    /// Clear the entire buffer to a solid color.
    pub fn clear(&mut self, c: &Rgba8) {
        self.rbuf.clear(*c);
    }

    /// Clip a span of `len` pixels starting at (x, y) to the buffer.
    /// Returns the first visible x, the number of pixels skipped at the
    /// start, and the visible length.
    #[inline]
    fn clip_span(&self, x: i32, y: i32, len: usize) -> Option<(usize, usize, usize)> {
        if y < 0 || y >= self.rbuf.height() as i32 || len == 0 {
            return None;
        }
        let w = self.rbuf.width() as i64;
        let x1 = (x as i64).max(0);
        let x2 = (x as i64 + len as i64).min(w);
        if x1 >= x2 {
            return None;
        }
        Some((x1 as usize, (x1 - x as i64) as usize, (x2 - x1) as usize))
    }

    /// Plain-alpha "source over" of one pixel.
    #[inline]
    fn blend_pix(p: &mut [u8], cr: u8, cg: u8, cb: u8, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            p[0] = cr;
            p[1] = cg;
            p[2] = cb;
            p[3] = 255;
            return;
        }
        let alpha = alpha as i32;
        let da = p[3] as i32;
        let r = p[0] as i32 * da;
        let g = p[1] as i32 * da;
        let b = p[2] as i32 * da;
        let a = ((alpha + da) << 8) - alpha * da;
        let mix = |c: u8, d: i32| -> u8 {
            let v = ((((c as i32) << 8) - d) * alpha + (d << 8)) / a;
            v.clamp(0, 255) as u8
        };
        p[0] = mix(cr, r);
        p[1] = mix(cg, g);
        p[2] = mix(cb, b);
        p[3] = (a >> 8).min(255) as u8;
    }
}

impl<'a> PixelFormat for PixfmtRgba32<'a> {
    type ColorType = Rgba8;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        if x < 0 || y < 0 {
            return Rgba8::TRANSPARENT;
        }
        self.rbuf
            .pixel(x as u32, y as u32)
            .unwrap_or(Rgba8::TRANSPARENT)
    }

    fn copy_pixel(&mut self, x: i32, y: i32, c: &Rgba8) {
        self.copy_hline(x, y, 1, c);
    }

    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8) {
        let Some((x1, _, n)) = self.clip_span(x, y, len as usize) else {
            return;
        };
        let px = c.to_array();
        let row = self.rbuf.row_slice_mut(y as u32);
        for chunk in row[x1 * BPP..(x1 + n) * BPP].chunks_exact_mut(BPP) {
            chunk.copy_from_slice(&px);
        }
    }

    fn copy_color_hspan(&mut self, x: i32, y: i32, colors: &[Rgba8]) {
        let Some((x1, skip, n)) = self.clip_span(x, y, colors.len()) else {
            return;
        };
        let row = self.rbuf.row_slice_mut(y as u32);
        let dst = row[x1 * BPP..(x1 + n) * BPP].chunks_exact_mut(BPP);
        for (p, c) in dst.zip(&colors[skip..skip + n]) {
            p.copy_from_slice(&c.to_array());
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: &Rgba8, cover: CoverType) {
        self.blend_hline(x, y, 1, c, cover);
    }

    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, cover: CoverType) {
        let Some((x1, _, n)) = self.clip_span(x, y, len as usize) else {
            return;
        };
        let alpha = Rgba8::mult_cover(c.a, cover);
        let row = self.rbuf.row_slice_mut(y as u32);
        for p in row[x1 * BPP..(x1 + n) * BPP].chunks_exact_mut(BPP) {
            Self::blend_pix(p, c.r, c.g, c.b, alpha);
        }
    }

    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Rgba8, covers: &[CoverType]) {
        let Some((x1, skip, n)) = self.clip_span(x, y, covers.len()) else {
            return;
        };
        let row = self.rbuf.row_slice_mut(y as u32);
        let dst = row[x1 * BPP..(x1 + n) * BPP].chunks_exact_mut(BPP);
        for (p, &cov) in dst.zip(&covers[skip..skip + n]) {
            Self::blend_pix(p, c.r, c.g, c.b, Rgba8::mult_cover(c.a, cov));
        }
    }

    fn blend_color_hspan(&mut self, x: i32, y: i32, colors: &[Rgba8], cover: CoverType) {
        let Some((x1, skip, n)) = self.clip_span(x, y, colors.len()) else {
            return;
        };
        let row = self.rbuf.row_slice_mut(y as u32);
        let dst = row[x1 * BPP..(x1 + n) * BPP].chunks_exact_mut(BPP);
        for (p, c) in dst.zip(&colors[skip..skip + n]) {
            let alpha = if cover == COVER_FULL {
                c.a
            } else {
                Rgba8::mult_cover(c.a, cover)
            };
            Self::blend_pix(p, c.r, c.g, c.b, alpha);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let mut rb = RenderingBuffer::new(100, 50);
        let pf = PixfmtRgba32::new(&mut rb);
        assert_eq!(pf.width(), 100);
        assert_eq!(pf.height(), 50);
    }

    #[test]
    fn test_copy_pixel() {
        let mut rb = RenderingBuffer::new(10, 10);
        let mut pf = PixfmtRgba32::new(&mut rb);
        let red = Rgba8::new(255, 0, 0, 255);
        pf.copy_pixel(5, 5, &red);
        assert_eq!(pf.pixel(5, 5), red);
        assert_eq!(pf.pixel(4, 5), Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_copy_hline_clipped() {
        let mut rb = RenderingBuffer::new(20, 10);
        let mut pf = PixfmtRgba32::new(&mut rb);
        let green = Rgba8::new(0, 255, 0, 255);
        pf.copy_hline(-5, 3, 10, &green);
        for x in 0..5 {
            assert_eq!(pf.pixel(x, 3), green);
        }
        assert_eq!(pf.pixel(5, 3), Rgba8::TRANSPARENT);
        pf.copy_hline(15, 3, 100, &green);
        assert_eq!(pf.pixel(19, 3), green);
        // Rows outside the buffer are ignored.
        pf.copy_hline(0, -1, 5, &green);
        pf.copy_hline(0, 10, 5, &green);
    }

    #[test]
    fn test_blend_opaque_overwrites() {
        let mut rb = RenderingBuffer::new(4, 1);
        let mut pf = PixfmtRgba32::new(&mut rb);
        pf.clear(&Rgba8::new_opaque(10, 20, 30));
        pf.blend_pixel(1, 0, &Rgba8::new_opaque(200, 100, 50), COVER_FULL);
        assert_eq!(pf.pixel(1, 0), Rgba8::new_opaque(200, 100, 50));
    }

    #[test]
    fn test_blend_half_over_opaque() {
        let mut rb = RenderingBuffer::new(1, 1);
        let mut pf = PixfmtRgba32::new(&mut rb);
        pf.clear(&Rgba8::new_opaque(255, 255, 255));
        pf.blend_pixel(0, 0, &Rgba8::new(0, 0, 0, 128), COVER_FULL);
        let p = pf.pixel(0, 0);
        assert!((p.r as i32 - 127).abs() <= 1, "{p:?}");
        assert_eq!(p.r, p.g);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_blend_onto_transparent_keeps_color() {
        let mut rb = RenderingBuffer::new(1, 1);
        let mut pf = PixfmtRgba32::new(&mut rb);
        pf.blend_pixel(0, 0, &Rgba8::new(200, 40, 10, 128), COVER_FULL);
        let p = pf.pixel(0, 0);
        assert_eq!((p.r, p.g, p.b), (200, 40, 10));
        assert_eq!(p.a, 128);
    }

    #[test]
    fn test_blend_solid_hspan_covers() {
        let mut rb = RenderingBuffer::new(5, 1);
        let mut pf = PixfmtRgba32::new(&mut rb);
        let covers = [0u8, 255, 0];
        pf.blend_solid_hspan(-1, 0, &Rgba8::new_opaque(9, 9, 9), &covers);
        // covers[1] lands on x = 0
        assert_eq!(pf.pixel(0, 0), Rgba8::new_opaque(9, 9, 9));
        assert_eq!(pf.pixel(1, 0), Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_blend_color_hspan() {
        let mut rb = RenderingBuffer::new(3, 1);
        let mut pf = PixfmtRgba32::new(&mut rb);
        pf.clear(&Rgba8::new_opaque(0, 0, 255));
        let colors = [
            Rgba8::TRANSPARENT,
            Rgba8::new_opaque(255, 0, 0),
            Rgba8::new(0, 255, 0, 0),
        ];
        pf.blend_color_hspan(0, 0, &colors, COVER_FULL);
        assert_eq!(pf.pixel(0, 0), Rgba8::new_opaque(0, 0, 255));
        assert_eq!(pf.pixel(1, 0), Rgba8::new_opaque(255, 0, 0));
        assert_eq!(pf.pixel(2, 0), Rgba8::new_opaque(0, 0, 255));
    }
}
