//! Foundation types, constants, and numeric helpers.
//!
//! The small set of AGG basics the watermark pipeline relies on: coverage
//! constants, rounding helpers and angle conversion.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round a double to the nearest unsigned integer (round half up).
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

// ============================================================================
// Cover (anti-aliasing) constants
// ============================================================================

/// The type used for anti-aliasing coverage values.
pub type CoverType = u8;

pub const COVER_SHIFT: u32 = 8;
pub const COVER_SIZE: u32 = 1 << COVER_SHIFT;
pub const COVER_MASK: u32 = COVER_SIZE - 1;
pub const COVER_NONE: CoverType = 0;
pub const COVER_FULL: CoverType = COVER_MASK as CoverType;

/// Convert a fractional coverage in `[0, 1]` to a cover value.
#[inline]
pub fn cover_from_area(area: f32) -> CoverType {
    if area <= 0.0 {
        COVER_NONE
    } else if area >= 1.0 {
        COVER_FULL
    } else {
        (area * COVER_MASK as f32 + 0.5) as CoverType
    }
}

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.4), 0);
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(-1.4), -1);
    }

    #[test]
    fn test_uround() {
        assert_eq!(uround(2.49), 2);
        assert_eq!(uround(2.5), 3);
    }

    #[test]
    fn test_cover_from_area() {
        assert_eq!(cover_from_area(-0.25), COVER_NONE);
        assert_eq!(cover_from_area(0.0), COVER_NONE);
        assert_eq!(cover_from_area(0.5), 128);
        assert_eq!(cover_from_area(1.0), COVER_FULL);
        assert_eq!(cover_from_area(3.0), COVER_FULL);
    }

    #[test]
    fn test_deg2rad() {
        assert!((deg2rad(180.0) - PI).abs() < 1e-12);
        assert!((deg2rad(20.0).sin() - 0.3420201433256687).abs() < 1e-12);
    }
}
