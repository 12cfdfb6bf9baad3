//! Anti-aliased polygon rasterizer.
//!
//! Same contract as AGG's `rasterizer_scanline_aa`: polygons go in through
//! `move_to_d` / `line_to_d` / `close_polygon` (or a whole `PathStorage`),
//! and per-scanline coverage comes out under the non-zero winding rule,
//! which is what TrueType and the built-in font outlines are drawn for.
//!
//! Internally each edge deposits exact signed area into a dense cell grid
//! (one row of `width + 2` cells per scanline); a running sum along the row
//! turns the deposits into winding-weighted coverage. Tiles and canvases are
//! bounded in size, so a dense grid beats AGG's sorted sparse cells here and
//! clipping becomes trivial: rows outside the buffer are skipped, and x is
//! split at the left and right edges and clamped into range.

use std::ops::Range;

use crate::basics::{cover_from_area, CoverType};
use crate::path_storage::PathStorage;
use crate::trans_affine::TransAffine;

/// Anti-aliased scanline polygon rasterizer over a fixed-size area.
pub struct RasterizerScanlineAa {
    width: u32,
    height: u32,
    stride: usize,
    cells: Vec<f32>,
    start: (f64, f64),
    cur: (f64, f64),
    has_contour: bool,
    rows: Option<(u32, u32)>,
}

impl RasterizerScanlineAa {
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width as usize + 2;
        Self {
            width,
            height,
            stride,
            cells: vec![0.0; stride * height as usize],
            start: (0.0, 0.0),
            cur: (0.0, 0.0),
            has_contour: false,
            rows: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Discard all accumulated geometry.
    pub fn reset(&mut self) {
        self.cells.fill(0.0);
        self.has_contour = false;
        self.rows = None;
    }

    // ---------------------------------------------------------------
    // Geometry input
    // ---------------------------------------------------------------

    /// Begin a new contour, closing the previous one.
    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.close_polygon();
        self.start = (x, y);
        self.cur = (x, y);
        self.has_contour = true;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        if !self.has_contour {
            self.start = self.cur;
            self.has_contour = true;
        }
        let (x0, y0) = self.cur;
        self.add_line(x0, y0, x, y);
        self.cur = (x, y);
    }

    /// Close the current contour back to its start point.
    pub fn close_polygon(&mut self) {
        if self.has_contour {
            let (x0, y0) = self.cur;
            let (x1, y1) = self.start;
            self.add_line(x0, y0, x1, y1);
            self.cur = self.start;
            self.has_contour = false;
        }
    }

    /// Add every sub-path of `path`, transformed by `mtx`.
    pub fn add_path(&mut self, path: &PathStorage, mtx: &TransAffine) {
        for contour in path.contours(mtx, mtx.get_scale()) {
            let mut points = contour.into_iter();
            if let Some((x, y)) = points.next() {
                self.move_to_d(x, y);
                for (x, y) in points {
                    self.line_to_d(x, y);
                }
                self.close_polygon();
            }
        }
    }

    // ---------------------------------------------------------------
    // Edge accumulation
    // ---------------------------------------------------------------

    /// Split an edge where it crosses the left or right buffer edge, then
    /// accumulate the pieces with x clamped into `[0, width]`.
    fn add_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let w = self.width as f64;
        for bound in [0.0, w] {
            if (x0 < bound && x1 > bound) || (x0 > bound && x1 < bound) {
                let ym = y0 + (y1 - y0) * (bound - x0) / (x1 - x0);
                self.add_line(x0, y0, bound, ym);
                self.add_line(bound, ym, x1, y1);
                return;
            }
        }
        self.accumulate(x0.clamp(0.0, w), y0, x1.clamp(0.0, w), y1);
    }

    #[inline]
    fn deposit(&mut self, idx: usize, v: f64) {
        self.cells[idx] += v as f32;
    }

    /// Deposit the signed area of one clipped edge into the cells it crosses.
    fn accumulate(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        if y0 == y1 {
            return;
        }
        let (dir, x0, y0, x1, y1) = if y0 < y1 {
            (1.0, x0, y0, x1, y1)
        } else {
            (-1.0, x1, y1, x0, y0)
        };
        let h = self.height as f64;
        if y1 <= 0.0 || y0 >= h {
            return;
        }
        let w = self.width as f64;
        let dxdy = (x1 - x0) / (y1 - y0);
        let mut x = x0;
        if y0 < 0.0 {
            x -= y0 * dxdy;
        }

        let row_start = y0.max(0.0) as usize;
        let row_end = y1.min(h).ceil() as usize;
        self.touch_rows(row_start as u32, row_end as u32);

        for row in row_start..row_end {
            let dy = ((row + 1) as f64).min(y1) - (row as f64).max(y0);
            let xnext = x + dxdy * dy;
            let d = dy * dir;
            let base = row * self.stride;

            let (xa, xb) = if x < xnext { (x, xnext) } else { (xnext, x) };
            let xa = xa.clamp(0.0, w);
            let xb = xb.clamp(0.0, w);
            let xa_floor = xa.floor();
            let xa_i = xa_floor as usize;
            let xb_ceil = xb.ceil();
            let xb_i = xb_ceil as usize;

            if xb_i <= xa_i + 1 {
                // The edge stays within one pixel column on this row.
                let xmf = 0.5 * (xa + xb) - xa_floor;
                self.deposit(base + xa_i, d - d * xmf);
                self.deposit(base + xa_i + 1, d * xmf);
            } else {
                let s = 1.0 / (xb - xa);
                let xa_f = xa - xa_floor;
                let a0 = 0.5 * s * (1.0 - xa_f) * (1.0 - xa_f);
                let xb_f = xb - xb_ceil + 1.0;
                let am = 0.5 * s * xb_f * xb_f;
                self.deposit(base + xa_i, d * a0);
                if xb_i == xa_i + 2 {
                    self.deposit(base + xa_i + 1, d * (1.0 - a0 - am));
                } else {
                    let a1 = s * (1.5 - xa_f);
                    self.deposit(base + xa_i + 1, d * (a1 - a0));
                    for xi in xa_i + 2..xb_i - 1 {
                        self.deposit(base + xi, d * s);
                    }
                    let a2 = a1 + (xb_i - xa_i - 3) as f64 * s;
                    self.deposit(base + xb_i - 1, d * (1.0 - a2 - am));
                }
                self.deposit(base + xb_i, d * am);
            }
            x = xnext;
        }
    }

    fn touch_rows(&mut self, first: u32, end: u32) {
        if first >= end {
            return;
        }
        self.rows = Some(match self.rows {
            None => (first, end),
            Some((a, b)) => (a.min(first), b.max(end)),
        });
    }

    // ---------------------------------------------------------------
    // Coverage output
    // ---------------------------------------------------------------

    /// Rows that may hold coverage.
    pub fn scanline_range(&self) -> Range<u32> {
        match self.rows {
            Some((a, b)) => a..b,
            None => 0..0,
        }
    }

    /// Convert an accumulated winding area to a cover value.
    #[inline]
    pub fn calculate_alpha(&self, area: f32) -> CoverType {
        cover_from_area(area.abs())
    }

    /// Fill `covers[0..width]` with the coverage of row `y`.
    /// Returns `false` when the row has no coverage at all.
    pub fn sweep_scanline(&self, y: u32, covers: &mut [CoverType]) -> bool {
        let w = self.width as usize;
        if y >= self.height || covers.len() < w {
            return false;
        }
        let base = y as usize * self.stride;
        let mut acc = 0.0f32;
        let mut any = false;
        for (cover, &cell) in covers[..w].iter_mut().zip(&self.cells[base..base + w]) {
            acc += cell;
            *cover = self.calculate_alpha(acc);
            any |= *cover != 0;
        }
        any
    }

    /// Whether pixel (x, y) receives any coverage.
    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        let base = y as usize * self.stride;
        let acc: f32 = self.cells[base..=base + x as usize].iter().sum();
        self.calculate_alpha(acc) != 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::COVER_FULL;

    fn coverage(ras: &RasterizerScanlineAa) -> Vec<Vec<CoverType>> {
        let mut rows = Vec::new();
        for y in 0..ras.height() {
            let mut covers = vec![0; ras.width() as usize];
            ras.sweep_scanline(y, &mut covers);
            rows.push(covers);
        }
        rows
    }

    fn total_area(ras: &RasterizerScanlineAa) -> f64 {
        coverage(ras)
            .iter()
            .flatten()
            .map(|&c| c as f64 / 255.0)
            .sum()
    }

    fn rect(ras: &mut RasterizerScanlineAa, x1: f64, y1: f64, x2: f64, y2: f64) {
        ras.move_to_d(x1, y1);
        ras.line_to_d(x2, y1);
        ras.line_to_d(x2, y2);
        ras.line_to_d(x1, y2);
        ras.close_polygon();
    }

    #[test]
    fn test_pixel_aligned_rect() {
        let mut ras = RasterizerScanlineAa::new(10, 10);
        rect(&mut ras, 2.0, 2.0, 6.0, 5.0);
        let cov = coverage(&ras);
        for (y, row) in cov.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                let inside = (2..6).contains(&x) && (2..5).contains(&y);
                assert_eq!(c, if inside { COVER_FULL } else { 0 }, "({x}, {y})");
            }
        }
        assert_eq!(ras.scanline_range(), 2..5);
    }

    #[test]
    fn test_half_pixel_edges() {
        let mut ras = RasterizerScanlineAa::new(10, 4);
        rect(&mut ras, 2.5, 0.0, 4.5, 4.0);
        let cov = coverage(&ras);
        assert_eq!(cov[1][1], 0);
        assert_eq!(cov[1][2], 128);
        assert_eq!(cov[1][3], COVER_FULL);
        assert_eq!(cov[1][4], 128);
        assert_eq!(cov[1][5], 0);
    }

    #[test]
    fn test_orientation_does_not_matter_for_nonzero() {
        let mut a = RasterizerScanlineAa::new(8, 8);
        rect(&mut a, 1.0, 1.0, 7.0, 7.0);
        let mut b = RasterizerScanlineAa::new(8, 8);
        b.move_to_d(1.0, 1.0);
        b.line_to_d(1.0, 7.0);
        b.line_to_d(7.0, 7.0);
        b.line_to_d(7.0, 1.0);
        b.close_polygon();
        assert_eq!(coverage(&a), coverage(&b));
    }

    #[test]
    fn test_triangle_area() {
        let mut ras = RasterizerScanlineAa::new(16, 16);
        ras.move_to_d(1.0, 1.0);
        ras.line_to_d(13.0, 1.0);
        ras.line_to_d(1.0, 9.0);
        ras.close_polygon();
        // 12 * 8 / 2
        assert!((total_area(&ras) - 48.0).abs() < 0.2);
    }

    #[test]
    fn test_overlapping_contours_stay_filled() {
        let mut ras = RasterizerScanlineAa::new(10, 10);
        rect(&mut ras, 0.0, 0.0, 6.0, 6.0);
        rect(&mut ras, 3.0, 3.0, 9.0, 9.0);
        assert!(ras.hit_test(4, 4));
        assert!(ras.hit_test(1, 1));
        assert!(ras.hit_test(8, 8));
        let mut covers = vec![0; 10];
        assert!(ras.sweep_scanline(4, &mut covers));
        assert_eq!(covers[4], 255);
    }

    #[test]
    fn test_reversed_contour_cuts_hole() {
        let mut ras = RasterizerScanlineAa::new(10, 10);
        let mut path = PathStorage::new();
        path.rect(1.0, 1.0, 9.0, 9.0);
        path.rect_reversed(3.0, 3.0, 7.0, 7.0);
        ras.add_path(&path, &TransAffine::new());
        assert!(ras.hit_test(2, 2));
        assert!(!ras.hit_test(5, 5));
        assert!((total_area(&ras) - 48.0).abs() < 1e-3);
    }

    #[test]
    fn test_clipping() {
        let mut ras = RasterizerScanlineAa::new(10, 10);
        rect(&mut ras, -5.0, -5.0, 15.0, 15.0);
        assert!(coverage(&ras).iter().flatten().all(|&c| c == COVER_FULL));

        ras.reset();
        rect(&mut ras, 20.0, 2.0, 30.0, 8.0);
        rect(&mut ras, -30.0, 20.0, -20.0, 30.0);
        assert_eq!(total_area(&ras), 0.0);

        // Only the part left of the buffer is clipped away.
        ras.reset();
        rect(&mut ras, -4.0, 0.0, 4.0, 2.0);
        assert!((total_area(&ras) - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotated_square_through_path() {
        let mut ras = RasterizerScanlineAa::new(40, 40);
        let mut path = PathStorage::new();
        path.rect(-10.0, -10.0, 10.0, 10.0);
        let mtx = TransAffine::new_rotation(0.5) * TransAffine::new_translation(20.0, 20.0);
        ras.add_path(&path, &mtx);
        assert!((total_area(&ras) - 400.0).abs() < 0.5);
        assert!(ras.hit_test(20, 20));
        assert!(!ras.hit_test(0, 0));
    }

    #[test]
    fn test_empty_rasterizer() {
        let ras = RasterizerScanlineAa::new(0, 0);
        assert_eq!(ras.scanline_range(), 0..0);
        assert!(!ras.hit_test(0, 0));
    }
}
