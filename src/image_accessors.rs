//! Image pixel access with boundary handling.
//!
//! Accessors walk a [`RenderingBuffer`] span by span (`span`, then `next_x`
//! along the row, `next_y` down to the next row) and decide what a
//! coordinate outside the image maps to:
//!
//! - [`ImageAccessorWrap`] wraps each axis with a [`WrapMode`] (pattern
//!   tiling).
//! - [`ImageAccessorClone`] clamps to the nearest edge pixel (image
//!   resampling, so borders do not fade to transparent).
//!
//! Both implement [`ImageSource`], the interface span generators read
//! through. Every accessor returns one RGBA pixel as a 4-byte slice. Accessors must
//! not be built over an empty buffer.

use crate::rendering_buffer::{RenderingBuffer, BPP};

// ============================================================================
// ImageSource trait
// ============================================================================

/// Sequential pixel source for span generators.
pub trait ImageSource {
    /// Start a span of `len` pixels at `(x, y)`; returns the first pixel.
    fn span(&mut self, x: i32, y: i32, len: u32) -> &[u8];

    /// Next pixel to the right.
    fn next_x(&mut self) -> &[u8];

    /// Pixel below the span start.
    fn next_y(&mut self) -> &[u8];
}

// ============================================================================
// WrapMode trait
// ============================================================================

/// Coordinate wrapping mode for one axis.
pub trait WrapMode {
    /// Create a wrap mode for the given image dimension.
    fn new(size: u32) -> Self;

    /// Map a coordinate into `[0, size)`, remembering it.
    fn func(&mut self, v: i32) -> u32;

    /// Step the remembered coordinate by one.
    fn inc(&mut self) -> u32;
}

// ============================================================================
// WrapModeRepeat — modulo wrapping
// ============================================================================

/// Repeat (modulo) wrapping: coordinate `v` maps to `v mod size`, negatives
/// included, so a tile repeats in both directions from the origin.
#[derive(Debug, Clone, Copy)]
pub struct WrapModeRepeat {
    size: u32,
    add: u32,
    value: u32,
}

impl WrapMode for WrapModeRepeat {
    fn new(size: u32) -> Self {
        let size = size.max(1);
        Self {
            size,
            // Largest multiple of `size` below 2^30; biases negative inputs
            // back into the positive range before the modulo.
            add: size.wrapping_mul(0x3FFF_FFFF / size),
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = (v as u32).wrapping_add(self.add) % self.size;
        self.value
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.size {
            self.value = 0;
        }
        self.value
    }
}

// ============================================================================
// ImageAccessorWrap — per-axis wrap modes
// ============================================================================

/// Pixel accessor that maps every coordinate through a wrap mode per axis.
pub struct ImageAccessorWrap<'a, WX: WrapMode, WY: WrapMode> {
    rbuf: &'a RenderingBuffer,
    wrap_x: WX,
    wrap_y: WY,
    x0: i32,
    row_y: u32,
}

impl<'a, WX: WrapMode, WY: WrapMode> ImageAccessorWrap<'a, WX, WY> {
    pub fn new(rbuf: &'a RenderingBuffer) -> Self {
        Self {
            rbuf,
            wrap_x: WX::new(rbuf.width()),
            wrap_y: WY::new(rbuf.height()),
            x0: 0,
            row_y: 0,
        }
    }

    #[inline]
    fn at(&self, x: u32) -> &[u8] {
        let off = x as usize * BPP;
        &self.rbuf.row_slice(self.row_y)[off..off + BPP]
    }
}

impl<WX: WrapMode, WY: WrapMode> ImageSource for ImageAccessorWrap<'_, WX, WY> {
    fn span(&mut self, x: i32, y: i32, _len: u32) -> &[u8] {
        self.x0 = x;
        self.row_y = self.wrap_y.func(y);
        let x = self.wrap_x.func(x);
        self.at(x)
    }

    fn next_x(&mut self) -> &[u8] {
        let x = self.wrap_x.inc();
        self.at(x)
    }

    fn next_y(&mut self) -> &[u8] {
        self.row_y = self.wrap_y.inc();
        let x = self.wrap_x.func(self.x0);
        self.at(x)
    }
}

// ============================================================================
// ImageAccessorClone — clamp to edge
// ============================================================================

/// Pixel accessor that repeats the edge pixels outside the image.
///
/// Spans fully inside the image take a direct-offset fast path.
pub struct ImageAccessorClone<'a> {
    rbuf: &'a RenderingBuffer,
    x: i32,
    x0: i32,
    y: i32,
    fast_path: bool,
    pix_off: usize,
}

impl<'a> ImageAccessorClone<'a> {
    pub fn new(rbuf: &'a RenderingBuffer) -> Self {
        Self {
            rbuf,
            x: 0,
            x0: 0,
            y: 0,
            fast_path: false,
            pix_off: 0,
        }
    }

    fn pixel(&self) -> &[u8] {
        let cx = self.x.clamp(0, self.rbuf.width() as i32 - 1);
        let cy = self.y.clamp(0, self.rbuf.height() as i32 - 1);
        let off = cx as usize * BPP;
        &self.rbuf.row_slice(cy as u32)[off..off + BPP]
    }
}

impl ImageSource for ImageAccessorClone<'_> {
    fn span(&mut self, x: i32, y: i32, len: u32) -> &[u8] {
        self.x = x;
        self.x0 = x;
        self.y = y;
        if y >= 0
            && y < self.rbuf.height() as i32
            && x >= 0
            && x as i64 + len as i64 <= self.rbuf.width() as i64
        {
            self.fast_path = true;
            self.pix_off = x as usize * BPP;
            &self.rbuf.row_slice(y as u32)[self.pix_off..self.pix_off + BPP]
        } else {
            self.fast_path = false;
            self.pixel()
        }
    }

    fn next_x(&mut self) -> &[u8] {
        if self.fast_path {
            self.pix_off += BPP;
            &self.rbuf.row_slice(self.y as u32)[self.pix_off..self.pix_off + BPP]
        } else {
            self.x += 1;
            self.pixel()
        }
    }

    fn next_y(&mut self) -> &[u8] {
        self.y += 1;
        self.x = self.x0;
        if self.fast_path && self.y < self.rbuf.height() as i32 {
            self.pix_off = self.x as usize * BPP;
            &self.rbuf.row_slice(self.y as u32)[self.pix_off..self.pix_off + BPP]
        } else {
            self.fast_path = false;
            self.pixel()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;

    /// 3x2 image where pixel (x, y) has red = 10 * x + y.
    fn numbered() -> RenderingBuffer {
        let mut rb = RenderingBuffer::new(3, 2);
        for y in 0..2u32 {
            let row = rb.row_slice_mut(y);
            for x in 0..3u32 {
                let off = x as usize * BPP;
                row[off] = (10 * x + y) as u8;
                row[off + 3] = 255;
            }
        }
        rb
    }

    #[test]
    fn test_wrap_mode_repeat() {
        let mut w = WrapModeRepeat::new(5);
        assert_eq!(w.func(0), 0);
        assert_eq!(w.func(7), 2);
        assert_eq!(w.func(-1), 4);
        assert_eq!(w.func(-5), 0);
        assert_eq!(w.func(-6), 4);
        assert_eq!(w.inc(), 0);
        assert_eq!(w.inc(), 1);
    }

    #[test]
    fn test_wrap_accessor_tiles() {
        let rb = numbered();
        let mut acc = ImageAccessorWrap::<WrapModeRepeat, WrapModeRepeat>::new(&rb);
        assert_eq!(acc.span(4, 3, 4)[0], 11);
        assert_eq!(acc.next_x()[0], 21);
        assert_eq!(acc.next_x()[0], 1);
        assert_eq!(acc.span(-1, -1, 1)[0], 21);
        assert_eq!(acc.next_y()[0], 20);
    }

    #[test]
    fn test_clone_accessor_clamps() {
        let rb = numbered();
        let mut acc = ImageAccessorClone::new(&rb);
        // Fast path inside the image.
        assert_eq!(acc.span(0, 1, 3)[0], 1);
        assert_eq!(acc.next_x()[0], 11);
        assert_eq!(acc.next_x()[0], 21);
        // Outside: clamped to the edge.
        assert_eq!(acc.span(-2, -2, 1)[0], 0);
        assert_eq!(acc.next_x()[0], 0);
        assert_eq!(acc.next_x()[0], 0);
        assert_eq!(acc.next_x()[0], 10);
        assert_eq!(acc.span(5, 9, 1)[0], 21);
        let px = Rgba8::from_slice(acc.next_y());
        assert_eq!(px, Rgba8::new(21, 0, 0, 255));
    }
}
