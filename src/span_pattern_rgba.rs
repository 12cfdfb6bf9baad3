//! RGBA span pattern generator.
//!
//! Generates pixel spans by reading from a repeating source image. With
//! zero offsets the pattern is anchored at canvas `(0, 0)`, the same
//! placement a 2D canvas `createPattern(tile, "repeat")` fill uses.

use crate::color::Rgba8;
use crate::image_accessors::{ImageAccessorWrap, ImageSource, WrapModeRepeat};
use crate::pixfmt_rgba::PixelFormat;
use crate::renderer_scanline::{blend_rect_spans, SpanGenerator};
use crate::rendering_buffer::RenderingBuffer;

/// Span generator that reads spans from an image source with an offset.
pub struct SpanPatternRgba<Src> {
    src: Src,
    offset_x: u32,
    offset_y: u32,
}

impl<Src: ImageSource> SpanPatternRgba<Src> {
    pub fn new(src: Src, offset_x: u32, offset_y: u32) -> Self {
        Self {
            src,
            offset_x,
            offset_y,
        }
    }

    pub fn offset_x(&self) -> u32 {
        self.offset_x
    }

    pub fn set_offset_x(&mut self, v: u32) {
        self.offset_x = v;
    }

    pub fn offset_y(&self) -> u32 {
        self.offset_y
    }

    pub fn set_offset_y(&mut self, v: u32) {
        self.offset_y = v;
    }
}

impl<Src: ImageSource> SpanGenerator for SpanPatternRgba<Src> {
    type Color = Rgba8;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32) {
        let Some((first, rest)) = span.split_first_mut() else {
            return;
        };
        let sx = x.wrapping_add(self.offset_x as i32);
        let sy = y.wrapping_add(self.offset_y as i32);

        *first = Rgba8::from_slice(self.src.span(sx, sy, rest.len() as u32 + 1));
        for c in rest {
            *c = Rgba8::from_slice(self.src.next_x());
        }
    }
}

/// Blend `tile`, repeated from the origin, over the whole of `pf`.
///
/// An empty tile leaves the target untouched.
pub fn fill_pattern<PF>(pf: &mut PF, tile: &RenderingBuffer)
where
    PF: PixelFormat<ColorType = Rgba8>,
{
    if tile.is_empty() {
        return;
    }
    let (width, height) = (pf.width(), pf.height());
    let src = ImageAccessorWrap::<WrapModeRepeat, WrapModeRepeat>::new(tile);
    let mut pattern = SpanPatternRgba::new(src, 0, 0);
    blend_rect_spans(pf, 0, 0, width, height, &mut pattern);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixfmt_rgba::PixfmtRgba32;

    /// A simple test image source that returns a fixed color.
    struct ConstantSource {
        pixel: [u8; 4],
    }

    impl ImageSource for ConstantSource {
        fn span(&mut self, _x: i32, _y: i32, _len: u32) -> &[u8] {
            &self.pixel
        }

        fn next_x(&mut self) -> &[u8] {
            &self.pixel
        }

        fn next_y(&mut self) -> &[u8] {
            &self.pixel
        }
    }

    fn checker() -> RenderingBuffer {
        // 2x2: red, transparent / transparent, blue
        let mut tile = RenderingBuffer::new(2, 2);
        tile.data_mut()[..4].copy_from_slice(&[255, 0, 0, 255]);
        tile.data_mut()[12..].copy_from_slice(&[0, 0, 255, 255]);
        tile
    }

    #[test]
    fn test_constant_pattern() {
        let src = ConstantSource {
            pixel: [255, 0, 0, 255],
        };
        let mut pattern = SpanPatternRgba::new(src, 0, 0);
        pattern.prepare();

        let mut span = vec![Rgba8::TRANSPARENT; 5];
        pattern.generate(&mut span, 0, 0);
        assert!(span.iter().all(|&c| c == Rgba8::new_opaque(255, 0, 0)));

        // Empty spans are a no-op.
        pattern.generate(&mut [], 3, 3);
    }

    #[test]
    fn test_offset() {
        let tile = checker();
        let src = ImageAccessorWrap::<WrapModeRepeat, WrapModeRepeat>::new(&tile);
        let mut pattern = SpanPatternRgba::new(src, 1, 0);
        assert_eq!(pattern.offset_x(), 1);
        let mut span = vec![Rgba8::TRANSPARENT; 2];
        pattern.generate(&mut span, 0, 1);
        assert_eq!(span[0], Rgba8::new_opaque(0, 0, 255));

        pattern.set_offset_x(0);
        pattern.set_offset_y(1);
        assert_eq!(pattern.offset_y(), 1);
        pattern.generate(&mut span, 0, 1);
        assert_eq!(span[0], Rgba8::new_opaque(255, 0, 0));
    }

    #[test]
    fn test_fill_pattern_repeats_from_origin() {
        let tile = checker();
        let mut rb = RenderingBuffer::new(5, 3);
        rb.clear(Rgba8::new_opaque(0, 255, 0));
        {
            let mut pf = PixfmtRgba32::new(&mut rb);
            fill_pattern(&mut pf, &tile);
        }
        let red = Rgba8::new_opaque(255, 0, 0);
        let blue = Rgba8::new_opaque(0, 0, 255);
        let green = Rgba8::new_opaque(0, 255, 0);
        assert_eq!(rb.pixel(0, 0), Some(red));
        assert_eq!(rb.pixel(1, 0), Some(green));
        assert_eq!(rb.pixel(2, 0), Some(red));
        assert_eq!(rb.pixel(4, 0), Some(red));
        assert_eq!(rb.pixel(1, 1), Some(blue));
        assert_eq!(rb.pixel(3, 1), Some(blue));
        assert_eq!(rb.pixel(0, 2), Some(red));
    }

    #[test]
    fn test_fill_pattern_blends_translucent_tile() {
        let mut tile = RenderingBuffer::new(1, 1);
        tile.clear(Rgba8::new(0, 0, 0, 128));
        let mut rb = RenderingBuffer::new(3, 3);
        rb.clear(Rgba8::new_opaque(255, 255, 255));
        {
            let mut pf = PixfmtRgba32::new(&mut rb);
            fill_pattern(&mut pf, &tile);
        }
        let p = rb.pixel(1, 1).unwrap();
        assert_eq!(p.a, 255);
        assert!((126..=128).contains(&p.r), "got {p:?}");
        assert_eq!(p.r, p.g);
    }

    #[test]
    fn test_empty_tile_is_noop() {
        let mut rb = RenderingBuffer::new(2, 2);
        rb.clear(Rgba8::new_opaque(9, 9, 9));
        let before = rb.data().to_vec();
        {
            let mut pf = PixfmtRgba32::new(&mut rb);
            fill_pattern(&mut pf, &RenderingBuffer::new(0, 0));
        }
        assert_eq!(rb.data(), &before[..]);
    }
}
