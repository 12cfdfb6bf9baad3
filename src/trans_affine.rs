//! Affine transformation matrix.
//!
//! The 2D affine matrix of `agg_trans_affine.h`, restricted to what the
//! watermark pipeline needs: the text rotation of a tile and the
//! source-to-canvas scaling of an image.

/// 2D affine transformation matrix.
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// With y pointing down, a positive rotation angle turns clockwise on
/// screen, the same convention as a 2D canvas context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    /// Identity matrix.
    pub const IDENTITY: TransAffine = TransAffine {
        sx: 1.0,
        shy: 0.0,
        shx: 0.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new() -> Self {
        Self::IDENTITY
    }

    /// Rotation by `a` radians about the origin.
    pub fn new_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self {
            sx: ca,
            shy: sa,
            shx: -sa,
            sy: ca,
            ..Self::IDENTITY
        }
    }

    pub fn new_scaling(x: f64, y: f64) -> Self {
        Self {
            sx: x,
            sy: y,
            ..Self::IDENTITY
        }
    }

    pub fn new_translation(x: f64, y: f64) -> Self {
        Self {
            tx: x,
            ty: y,
            ..Self::IDENTITY
        }
    }

    /// `self = self * m`: `self` applies first, then `m`.
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        *self = Self {
            sx: self.sx * m.sx + self.shy * m.shx,
            shy: self.sx * m.shy + self.shy * m.sy,
            shx: self.shx * m.sx + self.sy * m.shx,
            sy: self.shx * m.shy + self.sy * m.sy,
            tx: self.tx * m.sx + self.ty * m.shx + m.tx,
            ty: self.tx * m.shy + self.ty * m.sy + m.ty,
        };
        self
    }

    /// Invert in place. A singular matrix yields non-finite entries.
    pub fn invert(&mut self) -> &mut Self {
        let d = 1.0 / self.determinant();
        let (sx, shy, shx, sy) = (self.sy * d, -self.shy * d, -self.shx * d, self.sx * d);
        *self = Self {
            sx,
            shy,
            shx,
            sy,
            tx: -self.tx * sx - self.ty * shx,
            ty: -self.tx * shy - self.ty * sy,
        };
        self
    }

    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.sx + y * self.shx + self.tx,
            x * self.shy + y * self.sy + self.ty,
        )
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    /// Average scale factor, used as the curve approximation scale.
    pub fn get_scale(&self) -> f64 {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let x = s * self.sx + s * self.shx;
        let y = s * self.shy + s * self.sy;
        (x * x + y * y).sqrt()
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for TransAffine {
    type Output = TransAffine;
    fn mul(mut self, rhs: TransAffine) -> TransAffine {
        self.multiply(&rhs);
        self
    }
}
