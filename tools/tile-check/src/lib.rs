// Pixel checks for rendered watermark tiles and composited canvases.
//
// Provides buffer comparison, diff images and tile ink statistics.

use std::fmt;
use std::path::Path;

use agg_watermark::rendering_buffer::RenderingBuffer;
use anyhow::{bail, Context};

// ============================================================================
// Comparison Result
// ============================================================================

/// Information about a single pixel difference.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffInfo {
    pub x: u32,
    pub y: u32,
    pub pixel_a: [u8; 4],
    pub pixel_b: [u8; 4],
}

/// Result of comparing two pixel buffers.
#[derive(Debug, Clone)]
pub struct CompareResult {
    pub total_pixels: u64,
    /// Pixels that differ by at least 1 in any channel.
    pub different_pixels: u64,
    pub max_channel_diff: u8,
    /// Mean absolute difference over the differing channels.
    pub mean_channel_diff: f64,
    /// First differing pixel, scanning left-to-right, top-to-bottom.
    pub first_diff: Option<DiffInfo>,
}

impl CompareResult {
    pub fn identical(&self) -> bool {
        self.different_pixels == 0
    }

    /// True when no channel differs by more than `tolerance`.
    pub fn within(&self, tolerance: u8) -> bool {
        self.max_channel_diff <= tolerance
    }
}

impl fmt::Display for CompareResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.identical() {
            return write!(f, "IDENTICAL: {} pixels match", self.total_pixels);
        }
        write!(
            f,
            "DIFFERENT: {}/{} pixels differ ({:.2}%), max_diff={}, mean_diff={:.4}",
            self.different_pixels,
            self.total_pixels,
            self.different_pixels as f64 / self.total_pixels as f64 * 100.0,
            self.max_channel_diff,
            self.mean_channel_diff,
        )?;
        if let Some(d) = &self.first_diff {
            write!(
                f,
                "\n  First diff at ({}, {}): A={:?} B={:?}",
                d.x, d.y, d.pixel_a, d.pixel_b
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Buffer Comparison
// ============================================================================

fn pixel_at(rb: &RenderingBuffer, x: u32, y: u32) -> [u8; 4] {
    let row = rb.row_slice(y);
    let i = x as usize * 4;
    [row[i], row[i + 1], row[i + 2], row[i + 3]]
}

/// Compare two RGBA buffers channel by channel.
pub fn compare_buffers(a: &RenderingBuffer, b: &RenderingBuffer) -> anyhow::Result<CompareResult> {
    if (a.width(), a.height()) != (b.width(), b.height()) {
        bail!(
            "size mismatch: {}x{} vs {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        );
    }

    let mut different_pixels = 0u64;
    let mut max_channel_diff = 0u8;
    let mut diff_sum = 0u64;
    let mut diff_channels = 0u64;
    let mut first_diff = None;

    for y in 0..a.height() {
        for x in 0..a.width() {
            let pa = pixel_at(a, x, y);
            let pb = pixel_at(b, x, y);
            let mut differs = false;
            for c in 0..4 {
                let d = pa[c].abs_diff(pb[c]);
                if d > 0 {
                    differs = true;
                    max_channel_diff = max_channel_diff.max(d);
                    diff_sum += d as u64;
                    diff_channels += 1;
                }
            }
            if differs {
                different_pixels += 1;
                if first_diff.is_none() {
                    first_diff = Some(DiffInfo {
                        x,
                        y,
                        pixel_a: pa,
                        pixel_b: pb,
                    });
                }
            }
        }
    }

    Ok(CompareResult {
        total_pixels: a.width() as u64 * a.height() as u64,
        different_pixels,
        max_channel_diff,
        mean_channel_diff: if diff_channels > 0 {
            diff_sum as f64 / diff_channels as f64
        } else {
            0.0
        },
        first_diff,
    })
}

/// Visual diff: identical pixels dark gray, differing pixels red scaled by
/// the largest channel difference (amplified 10x).
pub fn generate_diff_image(a: &RenderingBuffer, b: &RenderingBuffer) -> RenderingBuffer {
    let w = a.width().min(b.width());
    let h = a.height().min(b.height());
    let mut diff = RenderingBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let (pa, pb) = (pixel_at(a, x, y), pixel_at(b, x, y));
            let d = (0..4).map(|c| pa[c].abs_diff(pb[c])).max().unwrap_or(0);
            let out = if d == 0 {
                [40, 40, 40, 255]
            } else {
                [(d as u16 * 10).min(255) as u8, 0, 0, 255]
            };
            let i = x as usize * 4;
            diff.row_slice_mut(y)[i..i + 4].copy_from_slice(&out);
        }
    }
    diff
}

// ============================================================================
// Tile statistics
// ============================================================================

/// Alpha coverage summary of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InkStats {
    /// Pixels with non-zero alpha.
    pub inked: u64,
    pub max_alpha: u8,
    /// Inked pixels in the outermost row/column on each side:
    /// left, top, right, bottom. Ink here usually means clipped glyphs.
    pub edge_ink: [u64; 4],
    /// Bounding box of inked pixels as `(x1, y1, x2, y2)`, inclusive.
    pub bounds: Option<(u32, u32, u32, u32)>,
}

impl InkStats {
    pub fn touches_edge(&self) -> bool {
        self.edge_ink.iter().any(|&n| n > 0)
    }
}

impl fmt::Display for InkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inked={} max_alpha={}", self.inked, self.max_alpha)?;
        if let Some((x1, y1, x2, y2)) = self.bounds {
            write!(f, " bounds=({x1},{y1})-({x2},{y2})")?;
        }
        if self.touches_edge() {
            write!(f, " edge_ink(l,t,r,b)={:?}", self.edge_ink)?;
        }
        Ok(())
    }
}

pub fn ink_stats(rb: &RenderingBuffer) -> InkStats {
    let mut stats = InkStats::default();
    let (w, h) = (rb.width(), rb.height());
    for y in 0..h {
        let row = rb.row_slice(y);
        for x in 0..w {
            let a = row[x as usize * 4 + 3];
            if a == 0 {
                continue;
            }
            stats.inked += 1;
            stats.max_alpha = stats.max_alpha.max(a);
            if x == 0 {
                stats.edge_ink[0] += 1;
            }
            if y == 0 {
                stats.edge_ink[1] += 1;
            }
            if x + 1 == w {
                stats.edge_ink[2] += 1;
            }
            if y + 1 == h {
                stats.edge_ink[3] += 1;
            }
            stats.bounds = Some(match stats.bounds {
                None => (x, y, x, y),
                Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
            });
        }
    }
    stats
}

// ============================================================================
// Image I/O
// ============================================================================

pub fn load_rgba(path: &Path) -> anyhow::Result<RenderingBuffer> {
    let img = image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    RenderingBuffer::from_vec(w, h, img.into_raw())
        .with_context(|| format!("{} has an unexpected pixel layout", path.display()))
}

/// Save as PNG, or whatever format the extension names.
pub fn save_rgba(path: &Path, rb: &RenderingBuffer) -> anyhow::Result<()> {
    image::save_buffer(
        path,
        rb.data(),
        rb.width(),
        rb.height(),
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_watermark::{Rgba8, TileRenderer, WatermarkConfig};

    #[test]
    fn test_compare_identical_and_different() {
        let mut a = RenderingBuffer::new(4, 3);
        a.clear(Rgba8::new(10, 20, 30, 255));
        let mut b = a.clone();
        assert!(compare_buffers(&a, &b).unwrap().identical());

        b.row_slice_mut(2)[4..8].copy_from_slice(&[10, 25, 30, 255]);
        let r = compare_buffers(&a, &b).unwrap();
        assert_eq!(r.different_pixels, 1);
        assert_eq!(r.max_channel_diff, 5);
        assert!(r.within(5));
        assert!(!r.within(4));
        assert_eq!(r.first_diff.unwrap().x, 1);
    }

    #[test]
    fn test_compare_size_mismatch() {
        let a = RenderingBuffer::new(4, 3);
        let b = RenderingBuffer::new(3, 4);
        assert!(compare_buffers(&a, &b).is_err());
    }

    #[test]
    fn test_diff_image_marks_changes() {
        let a = RenderingBuffer::new(2, 1);
        let mut b = a.clone();
        b.row_slice_mut(0)[4..8].copy_from_slice(&[0, 0, 3, 0]);
        let d = generate_diff_image(&a, &b);
        assert_eq!(&d.data()[0..4], &[40, 40, 40, 255]);
        assert_eq!(&d.data()[4..8], &[30, 0, 0, 255]);
    }

    #[test]
    fn test_ink_stats_of_default_tile() {
        let tile = TileRenderer::new()
            .render_tile(&WatermarkConfig::default())
            .unwrap();
        let stats = ink_stats(tile.pixels());
        assert!(stats.inked > 0);
        assert!(stats.max_alpha <= 0x80);
        assert!(stats.bounds.is_some());
    }

    #[test]
    fn test_ink_stats_empty() {
        let stats = ink_stats(&RenderingBuffer::new(5, 5));
        assert_eq!(stats, InkStats::default());
        assert!(!stats.touches_edge());
    }
}
