//! Canvas export.
//!
//! Encodes composited RGBA pixels the way a canvas `toBlob(type, quality)`
//! does: the MIME type picks the format, unknown or missing types fall
//! back to PNG, and `quality` only affects lossy formats.

use std::fmt;
use std::io::Cursor;

use image::{ImageFormat, RgbImage, RgbaImage};

use crate::error::ExportError;
use crate::rendering_buffer::RenderingBuffer;

/// JPEG quality used when none (or an out-of-range one) is given.
pub const DEFAULT_JPEG_QUALITY: f64 = 0.92;

/// Output encoding chosen from a MIME type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Png,
    /// Quality 1-100.
    Jpeg(u8),
    /// Always lossless.
    WebP,
    Bmp,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Png
    }
}

impl ExportFormat {
    /// Resolve a MIME type and a `0.0..=1.0` quality into a format.
    pub fn from_mime(mime_type: &str, quality: Option<f64>) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" => ExportFormat::Jpeg(jpeg_quality(quality)),
            "image/webp" => ExportFormat::WebP,
            "image/bmp" => ExportFormat::Bmp,
            _ => ExportFormat::Png,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg(_) => "image/jpeg",
            ExportFormat::WebP => "image/webp",
            ExportFormat::Bmp => "image/bmp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg(_) => "jpg",
            ExportFormat::WebP => "webp",
            ExportFormat::Bmp => "bmp",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg(_) => "JPEG",
            ExportFormat::WebP => "WebP",
            ExportFormat::Bmp => "BMP",
        }
    }
}

fn jpeg_quality(quality: Option<f64>) -> u8 {
    let q = quality
        .filter(|q| (0.0..=1.0).contains(q))
        .unwrap_or(DEFAULT_JPEG_QUALITY);
    (q * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encoded image bytes with their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Encode `pixels` as `format`.
///
/// JPEG has no alpha channel; color channels are written as they are.
pub fn encode(pixels: &RenderingBuffer, format: ExportFormat) -> Result<Blob, ExportError> {
    if pixels.is_empty() {
        return Err(ExportError::NothingDrawn);
    }
    let (width, height) = (pixels.width(), pixels.height());
    let encode_failed = |reason: String| ExportError::Encode {
        format: format.label().to_string(),
        reason,
    };

    let rgba = RgbaImage::from_raw(width, height, pixels.data().to_vec())
        .ok_or_else(|| encode_failed("pixel buffer does not match its size".to_string()))?;

    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    match format {
        ExportFormat::Png => rgba.write_to(&mut cursor, ImageFormat::Png),
        ExportFormat::Bmp => rgba.write_to(&mut cursor, ImageFormat::Bmp),
        ExportFormat::Jpeg(quality) => {
            let rgb: RgbImage = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
            rgb.write_with_encoder(encoder)
        }
        ExportFormat::WebP => {
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut cursor);
            rgba.write_with_encoder(encoder)
        }
    }
    .map_err(|e| encode_failed(e.to_string()))?;

    Ok(Blob {
        mime_type: format.mime_type().to_string(),
        data: buffer,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;

    fn canvas() -> RenderingBuffer {
        let mut rb = RenderingBuffer::new(6, 4);
        rb.clear(Rgba8::new(40, 80, 120, 255));
        rb
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(ExportFormat::from_mime("image/png", None), ExportFormat::Png);
        assert_eq!(ExportFormat::from_mime("", None), ExportFormat::Png);
        assert_eq!(ExportFormat::from_mime("image/tiff", Some(0.5)), ExportFormat::Png);
        assert_eq!(ExportFormat::from_mime("IMAGE/JPEG", None), ExportFormat::Jpeg(92));
        assert_eq!(ExportFormat::from_mime("image/jpeg", Some(0.5)), ExportFormat::Jpeg(50));
        assert_eq!(ExportFormat::from_mime("image/jpeg", Some(0.0)), ExportFormat::Jpeg(1));
        assert_eq!(ExportFormat::from_mime("image/jpeg", Some(7.0)), ExportFormat::Jpeg(92));
        assert_eq!(ExportFormat::from_mime("image/webp", Some(0.1)), ExportFormat::WebP);
        assert_eq!(ExportFormat::from_mime("image/bmp", None).extension(), "bmp");
    }

    #[test]
    fn test_encode_round_trips_dimensions() {
        for (format, guess) in [
            (ExportFormat::Png, ImageFormat::Png),
            (ExportFormat::Jpeg(80), ImageFormat::Jpeg),
            (ExportFormat::WebP, ImageFormat::WebP),
            (ExportFormat::Bmp, ImageFormat::Bmp),
        ] {
            let blob = encode(&canvas(), format).unwrap();
            assert_eq!(blob.mime_type, format.mime_type());
            assert!(!blob.is_empty());
            assert_eq!(image::guess_format(&blob.data).unwrap(), guess);
            let img = image::load_from_memory(&blob.data).unwrap();
            assert_eq!((img.width(), img.height()), (6, 4));
        }
    }

    #[test]
    fn test_png_is_lossless() {
        let mut rb = canvas();
        rb.data_mut()[0..4].copy_from_slice(&[1, 2, 3, 4]);
        let blob = encode(&rb, ExportFormat::Png).unwrap();
        let back = image::load_from_memory(&blob.data).unwrap().to_rgba8();
        assert_eq!(back.as_raw(), rb.data());
    }

    #[test]
    fn test_empty_canvas_fails() {
        let err = encode(&RenderingBuffer::new(0, 0), ExportFormat::Png).unwrap_err();
        assert_eq!(err, ExportError::NothingDrawn);
    }
}
