//! Watermark configuration.
//!
//! [`WatermarkConfig`] is a plain value: every edit produces a new one that
//! replaces the old wholesale. [`WatermarkConfig::validate`] is the single
//! gate in front of the tile renderer.

use crate::color::Rgba8;
use crate::error::ConfigError;

/// Largest tile side, in pixels, after diagonal sizing.
pub const MAX_TILE_EXTENT: u32 = 16384;

/// Rotations at or beyond `90 - ROTATION_EPSILON` are rejected: the anchor
/// offset divides by `tan(90° - θ)`.
pub const ROTATION_EPSILON: f64 = 1e-6;

/// Default watermark text.
pub const DEFAULT_TEXT: &str = "仅用于办理住房公积金，他用无效。";

/// Text, style and tile geometry of a watermark.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct WatermarkConfig {
    pub text: String,

    /// Pixels per em.
    pub font_size: f64,

    /// Text color; its alpha is the watermark opacity.
    #[cfg_attr(feature = "serde", serde(alias = "fillStyle"))]
    pub fill_color: Rgba8,

    /// Logical (unrotated) tile width in pixels.
    #[cfg_attr(feature = "serde", serde(alias = "watermarkWidth"))]
    pub tile_width: f64,

    /// Logical tile height in pixels.
    #[cfg_attr(feature = "serde", serde(alias = "watermarkHeight"))]
    pub tile_height: f64,

    /// Visual tilt of the text, in degrees, `[0, 90)`.
    #[cfg_attr(feature = "serde", serde(alias = "rotate"))]
    pub rotation_degrees: f64,
}

/// The default text is Chinese. The built-in raster font only covers
/// printable ASCII, so without a TrueType font (feature `font`) it renders
/// as hollow boxes; see [`TileRenderer::missing_glyphs`].
///
/// [`TileRenderer::missing_glyphs`]: crate::tile_renderer::TileRenderer::missing_glyphs
impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            font_size: 26.0,
            fill_color: Rgba8::new(0, 0, 0, 0x80),
            tile_width: 252.0,
            tile_height: 180.0,
            rotation_degrees: 20.0,
        }
    }
}

impl WatermarkConfig {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_fill_color(mut self, fill_color: Rgba8) -> Self {
        self.fill_color = fill_color;
        self
    }

    pub fn with_tile_size(mut self, width: f64, height: f64) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Check every numeric field.
    ///
    /// Rotation must lie in `[0, 90)` with a guard band below 90, and the
    /// diagonal tile extent must not exceed [`MAX_TILE_EXTENT`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("font_size", self.font_size)?;
        positive("tile_width", self.tile_width)?;
        positive("tile_height", self.tile_height)?;

        let r = self.rotation_degrees;
        if !r.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "rotation_degrees",
            });
        }
        if !(0.0..90.0 - ROTATION_EPSILON).contains(&r) {
            return Err(ConfigError::RotationOutOfRange { degrees: r });
        }

        let extent = self.tile_width.hypot(self.tile_height).ceil();
        if extent > MAX_TILE_EXTENT as f64 {
            return Err(ConfigError::TileTooLarge {
                extent,
                max: MAX_TILE_EXTENT,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let c = WatermarkConfig::default();
        assert_eq!(c.font_size, 26.0);
        assert_eq!(c.fill_color, Rgba8::new(0, 0, 0, 128));
        assert_eq!((c.tile_width, c.tile_height), (252.0, 180.0));
        assert_eq!(c.rotation_degrees, 20.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let c = WatermarkConfig::new("A")
            .with_font_size(20.0)
            .with_tile_size(100.0, 100.0)
            .with_rotation(0.0)
            .with_fill_color(Rgba8::new_opaque(255, 0, 0));
        assert_eq!(c.text, "A");
        assert_eq!(c.tile_width, 100.0);
        assert!(c.fill_color.is_opaque());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive() {
        let c = WatermarkConfig::default().with_tile_size(0.0, 10.0);
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonPositive {
                field: "tile_width",
                value: 0.0
            })
        );
        let c = WatermarkConfig::default().with_font_size(-1.0);
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonPositive {
                field: "font_size",
                ..
            })
        ));
        let c = WatermarkConfig::default().with_tile_size(10.0, f64::NAN);
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonFinite {
                field: "tile_height"
            })
        );
    }

    #[test]
    fn test_rotation_range() {
        for ok in [0.0, 45.0, 89.9] {
            assert!(WatermarkConfig::default().with_rotation(ok).validate().is_ok());
        }
        for bad in [-0.5, 90.0, 90.0 - 1e-9, 135.0] {
            assert!(matches!(
                WatermarkConfig::default().with_rotation(bad).validate(),
                Err(ConfigError::RotationOutOfRange { .. })
            ));
        }
        assert!(matches!(
            WatermarkConfig::default()
                .with_rotation(f64::INFINITY)
                .validate(),
            Err(ConfigError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_tile_extent_limit() {
        let c = WatermarkConfig::default().with_tile_size(16000.0, 16000.0);
        assert!(matches!(
            c.validate(),
            Err(ConfigError::TileTooLarge { max: 16384, .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_accepts_form_names_and_defaults() {
        let json = r##"{"text":"draft","fillStyle":"#ff000080","watermarkWidth":300,"rotate":30}"##;
        let c: WatermarkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.text, "draft");
        assert_eq!(c.fill_color, Rgba8::new(255, 0, 0, 128));
        assert_eq!(c.tile_width, 300.0);
        assert_eq!(c.tile_height, 180.0);
        assert_eq!(c.rotation_degrees, 30.0);
        assert_eq!(c.font_size, 26.0);

        let out = serde_json::to_value(&c).unwrap();
        assert_eq!(out["fillColor"], "#ff000080");
        assert_eq!(out["tileWidth"], 300.0);
    }
}
