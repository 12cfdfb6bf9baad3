//! Linear span interpolator.
//!
//! Maps destination pixel positions back into source image space through an
//! affine transform, in fixed-point subpixel units. An affine map is linear
//! along a scanline, so only the span start and the per-pixel step are
//! transformed; every pixel position is derived from those two.

use crate::basics::iround;
use crate::trans_affine::TransAffine;

/// Subpixel precision of interpolated coordinates.
pub const SUBPIXEL_SHIFT: u32 = 8;
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;

/// Linear span interpolator over a [`TransAffine`].
///
/// The transform maps destination (canvas) coordinates to source image
/// coordinates, i.e. it is the inverse of the image placement matrix.
#[derive(Debug, Clone)]
pub struct SpanInterpolatorLinear {
    trans: TransAffine,
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
}

impl SpanInterpolatorLinear {
    pub fn new(trans: TransAffine) -> Self {
        Self {
            trans,
            x: 0.0,
            y: 0.0,
            dx: 0.0,
            dy: 0.0,
        }
    }

    pub fn transformer(&self) -> &TransAffine {
        &self.trans
    }

    /// Start a span at destination `(x, y)`.
    pub fn begin(&mut self, x: f64, y: f64) {
        let (x1, y1) = self.trans.transform_point(x, y);
        let (x2, y2) = self.trans.transform_point(x + 1.0, y);
        self.x = x1 * SUBPIXEL_SCALE as f64;
        self.y = y1 * SUBPIXEL_SCALE as f64;
        self.dx = (x2 - x1) * SUBPIXEL_SCALE as f64;
        self.dy = (y2 - y1) * SUBPIXEL_SCALE as f64;
    }

    /// Advance to the next pixel.
    #[inline]
    pub fn next(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }

    /// Current source coordinates in subpixel units.
    #[inline]
    pub fn coordinates(&self) -> (i32, i32) {
        (iround(self.x), iround(self.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new());
        interp.begin(10.0, 20.0);
        assert_eq!(interp.coordinates(), (10 * SUBPIXEL_SCALE, 20 * SUBPIXEL_SCALE));
        interp.next();
        assert_eq!(interp.coordinates(), (11 * SUBPIXEL_SCALE, 20 * SUBPIXEL_SCALE));
    }

    #[test]
    fn test_scaling_steps() {
        // Destination is half the size: each destination pixel moves two
        // source pixels.
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(2.0, 2.0));
        interp.begin(0.5, 0.5);
        assert_eq!(interp.coordinates(), (SUBPIXEL_SCALE, SUBPIXEL_SCALE));
        for _ in 0..3 {
            interp.next();
        }
        assert_eq!(interp.coordinates(), (7 * SUBPIXEL_SCALE, SUBPIXEL_SCALE));
    }

    #[test]
    fn test_rotation_moves_both_axes() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new_rotation(
            std::f64::consts::FRAC_PI_2,
        ));
        interp.begin(0.0, 0.0);
        interp.next();
        assert_eq!(interp.coordinates(), (0, SUBPIXEL_SCALE));
    }
}
