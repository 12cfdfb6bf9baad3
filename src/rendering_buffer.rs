//! Rendering buffer — row-oriented access to owned RGBA pixel data.
//!
//! AGG's `row_accessor` attaches to caller memory through raw pointers.
//! Every surface in the watermark pipeline (tile, scaled image layer, visible
//! canvas) owns its pixels, so this buffer owns a `Vec<u8>` and hands out
//! row slices instead. Rows are top-down, 4 bytes per pixel, no padding.

use crate::color::Rgba8;

/// Bytes per RGBA pixel.
pub const BPP: usize = 4;

/// Owned, tightly packed RGBA32 pixel storage.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RenderingBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RenderingBuffer {
    /// Allocate a transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * BPP],
            width,
            height,
        }
    }

    /// Wrap existing RGBA data. Returns `None` if the length does not match.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * BPP).then_some(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row length in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * BPP
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn row_slice(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    #[inline]
    pub fn row_slice_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = x as usize * BPP;
        Some(Rgba8::from_slice(&self.row_slice(y)[off..off + BPP]))
    }

    /// Fill every pixel with `c`.
    pub fn clear(&mut self, c: Rgba8) {
        let px = c.to_array();
        for chunk in self.data.chunks_exact_mut(BPP) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Resize to `width x height`, discarding all previous content.
    pub fn reallocate(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width as usize * height as usize * BPP, 0);
    }

    /// Copy another buffer's pixels, adopting its dimensions.
    pub fn copy_from(&mut self, src: &RenderingBuffer) {
        self.width = src.width;
        self.height = src.height;
        self.data.clear();
        self.data.extend_from_slice(&src.data);
    }

    /// Release the pixel memory, leaving a 0x0 buffer.
    pub fn release(&mut self) {
        self.width = 0;
        self.height = 0;
        self.data = Vec::new();
    }
}

impl std::fmt::Debug for RenderingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderingBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let rb = RenderingBuffer::new(4, 3);
        assert_eq!(rb.stride(), 16);
        assert_eq!(rb.data().len(), 48);
        assert!(rb.data().iter().all(|&b| b == 0));
        assert_eq!(rb.pixel(3, 2), Some(Rgba8::TRANSPARENT));
        assert_eq!(rb.pixel(4, 0), None);
    }

    #[test]
    fn test_rows_are_independent() {
        let mut rb = RenderingBuffer::new(2, 2);
        rb.row_slice_mut(1)[4..8].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(rb.pixel(1, 1), Some(Rgba8::new(1, 2, 3, 4)));
        assert_eq!(rb.pixel(1, 0), Some(Rgba8::TRANSPARENT));
    }

    #[test]
    fn test_reallocate_clears() {
        let mut rb = RenderingBuffer::new(2, 2);
        rb.clear(Rgba8::new_opaque(255, 0, 0));
        rb.reallocate(3, 1);
        assert_eq!((rb.width(), rb.height()), (3, 1));
        assert!(rb.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(RenderingBuffer::from_vec(2, 2, vec![0; 16]).is_some());
        assert!(RenderingBuffer::from_vec(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_release() {
        let mut rb = RenderingBuffer::new(8, 8);
        rb.release();
        assert!(rb.is_empty());
        assert!(rb.data().is_empty());
    }
}
