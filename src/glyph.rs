//! Glyph source abstraction.
//!
//! The tile renderer measures and draws text one character at a time, the
//! way a 2D canvas `measureText` / `fillText` pair is used for greedy
//! wrapping. A [`GlyphSource`] supplies exactly those two things: the
//! advance width of a character and its outline.
//!
//! Coordinates are text space with y pointing down; `(x, y)` is the pen
//! position on the baseline, so glyph bodies extend towards negative y.

use crate::path_storage::PathStorage;

/// Something that can measure and outline characters at a pixel size.
pub trait GlyphSource: Send + Sync {
    /// Horizontal advance of `ch` at `font_size` pixels per em.
    fn advance(&self, ch: char, font_size: f64) -> f64;

    /// Append the outline of `ch` with its origin at the pen position
    /// `(x, y)`. Characters without ink (spaces) append nothing.
    fn add_glyph(&self, ch: char, font_size: f64, x: f64, y: f64, path: &mut PathStorage);

    /// Whether `ch` has a real glyph. Characters without one still advance
    /// and draw a fallback shape.
    fn has_glyph(&self, _ch: char) -> bool {
        true
    }

    /// Total advance of a string.
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.advance(ch, font_size)).sum()
    }

    /// Append a whole string starting at the pen position. Returns the pen
    /// x after the last character.
    fn add_text(&self, text: &str, font_size: f64, x: f64, y: f64, path: &mut PathStorage) -> f64 {
        let mut pen = x;
        for ch in text.chars() {
            self.add_glyph(ch, font_size, pen, y, path);
            pen += self.advance(ch, font_size);
        }
        pen
    }
}
