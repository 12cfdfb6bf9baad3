//! Error types for watermark rendering and compositing.
//!
//! Three failure kinds, each with its own enum:
//! - [`ConfigError`]: a watermark configuration that cannot be rendered
//! - [`DecodeError`]: a source image that cannot be read or decoded
//! - [`ExportError`]: canvas pixels that cannot be serialized
//!
//! All of them convert into [`WatermarkError`], the error type of every
//! fallible public operation. None of them are fatal; the canvas stays
//! usable after any of them.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for watermark operations.
pub type Result<T> = std::result::Result<T, WatermarkError>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Invalid watermark configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Source image could not be loaded or decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Canvas could not be exported
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Invalid watermark configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("rotation must be in [0, 90) degrees, got {degrees}")]
    RotationOutOfRange { degrees: f64 },

    #[error("tile extent {extent}px exceeds the maximum of {max}px")]
    TileTooLarge { extent: f64, max: u32 },

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("invalid font data: {0}")]
    InvalidFont(String),
}

/// Failures while reading or decoding a source image.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data URL: {reason}")]
    InvalidDataUrl { reason: String },

    #[error("source is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("image is {width}x{height}, more than the {limit} pixel limit")]
    TooManyPixels { width: u32, height: u32, limit: u64 },

    #[error("source is empty")]
    Empty,

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Failures while serializing canvas pixels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("nothing has been drawn yet")]
    NothingDrawn,

    #[error("canvas has been destroyed")]
    Destroyed,

    #[error("failed to encode {format}: {reason}")]
    Encode { format: String, reason: String },
}

impl WatermarkError {
    pub fn is_config(&self) -> bool {
        matches!(self, WatermarkError::Config(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, WatermarkError::Decode(_))
    }

    pub fn is_export(&self) -> bool {
        matches!(self, WatermarkError::Export(_))
    }
}
