//! Color type and operations.
//!
//! `Rgba8` is the 8-bit non-premultiplied RGBA color used throughout the
//! pipeline, with AGG's exact fixed-point `multiply` / `lerp` helpers.
//!
//! Watermark colors arrive from form controls as CSS strings, so `Rgba8`
//! also parses the CSS forms a color picker produces (`#rgb`, `#rgba`,
//! `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` and a handful of keywords) and
//! formats back to hex.

use std::fmt;
use std::str::FromStr;

use crate::basics::{uround, CoverType};
use crate::error::ConfigError;

// ============================================================================
// Rgba8 (8-bit per channel)
// ============================================================================

/// RGBA color with u8 components, non-premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Rgba8 = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
        Self {
            r: r.min(Self::BASE_MASK) as u8,
            g: g.min(Self::BASE_MASK) as u8,
            b: b.min(Self::BASE_MASK) as u8,
            a: a.min(Self::BASE_MASK) as u8,
        }
    }

    pub fn new_opaque(r: u32, g: u32, b: u32) -> Self {
        Self::new(r, g, b, Self::BASE_MASK)
    }

    pub fn with_opacity(c: &Rgba8, a: u32) -> Self {
        Self {
            a: a.min(Self::BASE_MASK) as u8,
            ..*c
        }
    }

    /// Build from a 4-byte RGBA pixel slice.
    #[inline]
    pub fn from_slice(p: &[u8]) -> Self {
        Self {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == Self::BASE_MASK as u8
    }

    pub fn opacity(&self) -> f64 {
        self.a as f64 / Self::BASE_MASK as f64
    }

    pub fn set_opacity(&mut self, a: f64) -> &mut Self {
        self.a = uround(a.clamp(0.0, 1.0) * Self::BASE_MASK as f64) as u8;
        self
    }

    /// Fixed-point multiply, exact over u8.
    /// `(a * b + 128) >> 8`, with rounding correction.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Multiply a color component by a cover.
    #[inline]
    pub fn mult_cover(a: u8, b: CoverType) -> u8 {
        Self::multiply(a, b)
    }

    /// Interpolate p to q by a.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }
}

// ============================================================================
// CSS parsing / formatting
// ============================================================================

impl FromStr for Rgba8 {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let v = s.trim().to_ascii_lowercase();

        if let Some(hex) = v.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(args) = v
            .strip_prefix("rgba(")
            .or_else(|| v.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args).ok_or_else(invalid);
        }
        named_color(&v).ok_or_else(invalid)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u32::from_str_radix(&hex[i..i + 1], 16).ok();
    let byte = |i: usize| u32::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = nibble(0)? * 17;
            let g = nibble(1)? * 17;
            let b = nibble(2)? * 17;
            let a = if hex.len() == 4 { nibble(3)? * 17 } else { 255 };
            Some(Rgba8::new(r, g, b, a))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, a))
        }
        _ => None,
    }
}

/// Parse `r, g, b[, a]` or the space separated `r g b [/ a]` form.
fn parse_rgb_args(args: &str) -> Option<Rgba8> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u32> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 2.55,
            None => p.parse::<f64>().ok()?,
        };
        v.is_finite().then(|| uround(v.clamp(0.0, 255.0)))
    };
    let alpha = match parts.get(3) {
        Some(p) => {
            let v = match p.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => p.parse::<f64>().ok()?,
            };
            if !v.is_finite() {
                return None;
            }
            uround(v.clamp(0.0, 1.0) * 255.0)
        }
        None => 255,
    };
    Some(Rgba8::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named_color(name: &str) -> Option<Rgba8> {
    let c = match name {
        "transparent" => Rgba8::TRANSPARENT,
        "black" => Rgba8::new_opaque(0, 0, 0),
        "white" => Rgba8::new_opaque(255, 255, 255),
        "red" => Rgba8::new_opaque(255, 0, 0),
        "green" => Rgba8::new_opaque(0, 128, 0),
        "blue" => Rgba8::new_opaque(0, 0, 255),
        "gray" | "grey" => Rgba8::new_opaque(128, 128, 128),
        _ => return None,
    };
    Some(c)
}

impl fmt::Display for Rgba8 {
    /// Lowercase hex, with the alpha byte only when not fully opaque.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
