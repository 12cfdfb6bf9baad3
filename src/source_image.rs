//! Source image references and decoding.
//!
//! A [`SourceRef`] names where the encoded image comes from: raw bytes, a
//! `data:` URL (what a browser `FileReader` hands over), or a file path.
//! [`SourceImage::decode`] reads it, enforces [`LoadLimits`], and decodes it
//! with the `image` crate into straight RGBA.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::trace;

use crate::error::DecodeError;
use crate::rendering_buffer::RenderingBuffer;

/// Default upload size limit, 15 MiB.
pub const DEFAULT_MAX_BYTES: usize = 15 * 1024 * 1024;

/// Default decoded size limit, 100 megapixels.
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

const DATA_URL_PREFIX: &str = "data:";

// ============================================================================
// LoadLimits
// ============================================================================

/// Upper bounds checked before and after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    /// Largest accepted encoded payload, in bytes.
    pub max_bytes: usize,
    /// Largest accepted `width * height` of the decoded image.
    pub max_pixels: u64,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl LoadLimits {
    pub fn unlimited() -> Self {
        Self {
            max_bytes: usize::MAX,
            max_pixels: u64::MAX,
        }
    }
}

// ============================================================================
// SourceRef
// ============================================================================

/// Where an encoded image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    Bytes(Vec<u8>),
    DataUrl(String),
    Path(PathBuf),
}

impl From<Vec<u8>> for SourceRef {
    fn from(bytes: Vec<u8>) -> Self {
        SourceRef::Bytes(bytes)
    }
}

impl From<&[u8]> for SourceRef {
    fn from(bytes: &[u8]) -> Self {
        SourceRef::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for SourceRef {
    fn from(path: PathBuf) -> Self {
        SourceRef::Path(path)
    }
}

impl From<&Path> for SourceRef {
    fn from(path: &Path) -> Self {
        SourceRef::Path(path.to_path_buf())
    }
}

/// Strings are data URLs when they say so, file paths otherwise.
impl From<&str> for SourceRef {
    fn from(s: &str) -> Self {
        if s.starts_with(DATA_URL_PREFIX) {
            SourceRef::DataUrl(s.to_string())
        } else {
            SourceRef::Path(PathBuf::from(s))
        }
    }
}

impl SourceRef {
    /// Produce the encoded bytes, checking the size limit.
    pub fn read(&self, limits: &LoadLimits) -> Result<Cow<'_, [u8]>, DecodeError> {
        let bytes: Cow<'_, [u8]> = match self {
            SourceRef::Bytes(b) => Cow::Borrowed(b),
            SourceRef::DataUrl(url) => Cow::Owned(decode_data_url(url)?.0),
            SourceRef::Path(path) => {
                if let Ok(meta) = std::fs::metadata(path) {
                    check_size(meta.len() as usize, limits)?;
                }
                let data = std::fs::read(path).map_err(|source| DecodeError::Read {
                    path: path.clone(),
                    source,
                })?;
                Cow::Owned(data)
            }
        };
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        check_size(bytes.len(), limits)?;
        Ok(bytes)
    }
}

fn check_size(size: usize, limits: &LoadLimits) -> Result<(), DecodeError> {
    if size > limits.max_bytes {
        return Err(DecodeError::TooLarge {
            size,
            limit: limits.max_bytes,
        });
    }
    Ok(())
}

// ============================================================================
// data: URLs
// ============================================================================

/// Decode a `data:` URL into its payload and media type.
///
/// `;base64` payloads may contain ASCII whitespace; other payloads are
/// percent-decoded, with `+` left as is.
pub fn decode_data_url(url: &str) -> Result<(Vec<u8>, String), DecodeError> {
    let rest = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| invalid("URL does not start with 'data:'"))?;
    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing comma in data URL"))?;

    let mut parts = metadata.split(';');
    let media_type = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let cleaned: Vec<u8> = data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| invalid(&format!("invalid base64: {e}")))?
    } else {
        percent_decode(data)?
    };
    Ok((bytes, media_type))
}

fn percent_decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| invalid("invalid percent-escape"))?;
        out.push(hex);
        i += 3;
    }
    Ok(out)
}

fn invalid(reason: &str) -> DecodeError {
    DecodeError::InvalidDataUrl {
        reason: reason.to_string(),
    }
}

// ============================================================================
// SourceImage
// ============================================================================

/// A decoded image in straight (non-premultiplied) RGBA.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RenderingBuffer,
}

impl SourceImage {
    /// Read and decode `source`.
    pub fn decode(source: &SourceRef, limits: &LoadLimits) -> Result<Self, DecodeError> {
        let bytes = source.read(limits)?;
        Self::from_encoded(&bytes, limits)
    }

    /// Decode an in-memory encoded image (format sniffed from its header).
    pub fn from_encoded(bytes: &[u8], limits: &LoadLimits) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        check_size(bytes.len(), limits)?;

        let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?;
        let (width, height) = reader.into_dimensions()?;
        check_pixels(width, height, limits)?;

        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        trace!(width, height, bytes = bytes.len(), "decoded source image");
        let pixels = RenderingBuffer::from_vec(width, height, decoded.into_raw())
            .ok_or(DecodeError::Empty)?;
        Self::from_pixels(pixels)
    }

    /// Wrap an already decoded RGBA buffer.
    pub fn from_pixels(pixels: RenderingBuffer) -> Result<Self, DecodeError> {
        if pixels.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Natural `(width, height)`.
    pub fn natural_size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixels(&self) -> &RenderingBuffer {
        &self.pixels
    }
}

fn check_pixels(width: u32, height: u32, limits: &LoadLimits) -> Result<(), DecodeError> {
    if width as u64 * height as u64 > limits.max_pixels {
        return Err(DecodeError::TooManyPixels {
            width,
            height,
            limit: limits.max_pixels,
        });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
