//! RGBA image transformation span generators.
//!
//! Bilinear resampling of an RGBA image through an affine transform, plus
//! [`draw_image_scaled`], which uses it to place a decoded photo at its
//! display size.
//!
//! Sample positions are pixel centers: destination pixel `(x, y)` samples
//! the source at the inverse image of `(x + 0.5, y + 0.5)`, shifted back by
//! half a source pixel to address the top-left of the 2x2 footprint.

use crate::color::Rgba8;
use crate::image_accessors::{ImageAccessorClone, ImageSource};
use crate::pixfmt_rgba::PixfmtRgba32;
use crate::renderer_scanline::{copy_rect_spans, SpanGenerator};
use crate::rendering_buffer::RenderingBuffer;
use crate::span_interpolator_linear::{SpanInterpolatorLinear, SUBPIXEL_SCALE, SUBPIXEL_SHIFT};
use crate::trans_affine::TransAffine;

const IMAGE_SUBPIXEL_MASK: i32 = SUBPIXEL_SCALE - 1;

// ============================================================================
// SpanImageFilterRgbaBilinear
// ============================================================================

/// Bilinear image filter for RGBA images.
///
/// Weights the four source pixels around each sample point by their
/// subpixel distance. The source decides what lies outside the image.
pub struct SpanImageFilterRgbaBilinear<'a, S: ImageSource> {
    source: &'a mut S,
    interpolator: SpanInterpolatorLinear,
}

impl<'a, S: ImageSource> SpanImageFilterRgbaBilinear<'a, S> {
    pub fn new(source: &'a mut S, interpolator: SpanInterpolatorLinear) -> Self {
        Self {
            source,
            interpolator,
        }
    }

    pub fn interpolator(&self) -> &SpanInterpolatorLinear {
        &self.interpolator
    }
}

impl<S: ImageSource> SpanGenerator for SpanImageFilterRgbaBilinear<'_, S> {
    type Color = Rgba8;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32) {
        self.interpolator.begin(x as f64 + 0.5, y as f64 + 0.5);

        let half = SUBPIXEL_SCALE * SUBPIXEL_SCALE / 2;
        let subpix = SUBPIXEL_SCALE;
        let shift = SUBPIXEL_SHIFT * 2;

        for pixel in span.iter_mut() {
            let (mut x_hr, mut y_hr) = self.interpolator.coordinates();
            x_hr -= SUBPIXEL_SCALE / 2;
            y_hr -= SUBPIXEL_SCALE / 2;

            let x_lr = x_hr >> SUBPIXEL_SHIFT;
            let y_lr = y_hr >> SUBPIXEL_SHIFT;
            let x_frac = x_hr & IMAGE_SUBPIXEL_MASK;
            let y_frac = y_hr & IMAGE_SUBPIXEL_MASK;

            let mut fg = [half; 4];
            let mut accumulate = |p: &[u8], weight: i32| {
                for (acc, &v) in fg.iter_mut().zip(p) {
                    *acc += weight * v as i32;
                }
            };

            accumulate(self.source.span(x_lr, y_lr, 2), (subpix - x_frac) * (subpix - y_frac));
            accumulate(self.source.next_x(), x_frac * (subpix - y_frac));
            accumulate(self.source.next_y(), (subpix - x_frac) * y_frac);
            accumulate(self.source.next_x(), x_frac * y_frac);

            *pixel = Rgba8::new(
                (fg[0] >> shift) as u32,
                (fg[1] >> shift) as u32,
                (fg[2] >> shift) as u32,
                (fg[3] >> shift) as u32,
            );

            self.interpolator.next();
        }
    }
}

// ============================================================================
// draw_image_scaled
// ============================================================================

/// Replace the contents of `dst` with `src` scaled to fill it exactly.
///
/// Edges are clamped, so border pixels keep their color instead of fading
/// to transparent. Same-size draws are a straight copy.
pub fn draw_image_scaled(dst: &mut RenderingBuffer, src: &RenderingBuffer) {
    if dst.is_empty() {
        return;
    }
    if src.is_empty() {
        dst.clear(Rgba8::TRANSPARENT);
        return;
    }
    if (dst.width(), dst.height()) == (src.width(), src.height()) {
        dst.copy_from(src);
        return;
    }

    let mut img_mtx = TransAffine::new_scaling(
        dst.width() as f64 / src.width() as f64,
        dst.height() as f64 / src.height() as f64,
    );
    img_mtx.invert();

    let (width, height) = (dst.width(), dst.height());
    let mut source = ImageAccessorClone::new(src);
    let interpolator = SpanInterpolatorLinear::new(img_mtx);
    let mut sg = SpanImageFilterRgbaBilinear::new(&mut source, interpolator);
    let mut pf = PixfmtRgba32::new(dst);
    copy_rect_spans(&mut pf, 0, 0, width, height, &mut sg);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, c: Rgba8) -> RenderingBuffer {
        let mut rb = RenderingBuffer::new(w, h);
        rb.clear(c);
        rb
    }

    #[test]
    fn test_solid_stays_solid_when_scaled() {
        let c = Rgba8::new(10, 200, 30, 255);
        let src = solid(40, 20, c);
        let mut dst = RenderingBuffer::new(12, 6);
        draw_image_scaled(&mut dst, &src);
        for y in 0..6 {
            for x in 0..12 {
                assert_eq!(dst.pixel(x, y), Some(c), "at {x},{y}");
            }
        }
    }

    #[test]
    fn test_same_size_is_copy() {
        let mut src = RenderingBuffer::new(3, 3);
        src.data_mut()[16..20].copy_from_slice(&[1, 2, 3, 4]);
        let mut dst = solid(3, 3, Rgba8::new_opaque(255, 255, 255));
        draw_image_scaled(&mut dst, &src);
        assert_eq!(dst.data(), src.data());
    }

    #[test]
    fn test_downscale_halves_and_keeps_sides_apart() {
        // Left half black, right half white; 2x downscale keeps the split.
        let mut src = solid(8, 2, Rgba8::new_opaque(0, 0, 0));
        for y in 0..2 {
            let row = src.row_slice_mut(y);
            for px in row[16..].chunks_exact_mut(4) {
                px.copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let mut dst = RenderingBuffer::new(4, 1);
        draw_image_scaled(&mut dst, &src);
        assert_eq!(dst.pixel(0, 0), Some(Rgba8::new_opaque(0, 0, 0)));
        assert_eq!(dst.pixel(3, 0), Some(Rgba8::new_opaque(255, 255, 255)));
        let mid = dst.pixel(1, 0).unwrap();
        assert!(mid.r < 128);
    }

    #[test]
    fn test_upscale_interpolates() {
        let mut src = RenderingBuffer::new(2, 1);
        src.data_mut()
            .copy_from_slice(&[0, 0, 0, 255, 200, 200, 200, 255]);
        let mut dst = RenderingBuffer::new(4, 1);
        draw_image_scaled(&mut dst, &src);
        let r: Vec<u8> = (0..4).map(|x| dst.pixel(x, 0).unwrap().r).collect();
        assert_eq!(r[0], 0);
        assert_eq!(r[3], 200);
        assert!(r[1] > 0 && r[1] < r[2] && r[2] < 200, "{r:?}");
    }

    #[test]
    fn test_empty_source_clears() {
        let mut dst = solid(2, 2, Rgba8::new_opaque(1, 1, 1));
        draw_image_scaled(&mut dst, &RenderingBuffer::new(0, 0));
        assert!(dst.data().iter().all(|&b| b == 0));
    }
}
