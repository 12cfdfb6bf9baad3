//! Built-in 5x7 bitmap font.
//!
//! A classic 5x7 dot-matrix face for printable ASCII (0x20..=0x7E), turned
//! into outlines so it scales and rotates through the same rasterizer as a
//! TrueType font. Each horizontal run of set dots becomes one rectangle.
//!
//! Metrics are in font units with 10 units per em: dots are 1 unit square,
//! a cell is 5 units wide with 1 unit of spacing, and the 7 rows sit
//! directly on the baseline. Characters outside ASCII advance a full em and
//! draw a hollow box, so CJK watermark text still wraps with realistic
//! widths even without a TrueType font.

use crate::glyph::GlyphSource;
use crate::path_storage::PathStorage;

/// Font units per em.
pub const UNITS_PER_EM: f64 = 10.0;

const GLYPH_ROWS: usize = 7;
const GLYPH_COLS: usize = 5;
const ASCII_ADVANCE: f64 = 6.0;
const WIDE_ADVANCE: f64 = 10.0;

/// Rows top to bottom, 5 bits each, most significant bit is the leftmost dot.
#[rustfmt::skip]
static GLYPHS: [[u8; GLYPH_ROWS]; 95] = [
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000], // ' '
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00000, 0b00100], // '!'
    [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000], // '"'
    [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010], // '#'
    [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100], // '$'
    [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011], // '%'
    [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101], // '&'
    [0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000], // '\''
    [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010], // '('
    [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000], // ')'
    [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000], // '*'
    [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000], // '+'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000], // ','
    [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000], // '-'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100], // '.'
    [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000], // '/'
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // '0'
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // '1'
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // '2'
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // '3'
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // '4'
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // '5'
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // '6'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // '7'
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // '8'
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // '9'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000], // ':'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000], // ';'
    [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010], // '<'
    [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000], // '='
    [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000], // '>'
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100], // '?'
    [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110], // '@'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001], // 'A'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // 'B'
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // 'C'
    [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100], // 'D'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // 'E'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // 'F'
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // 'G'
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // 'H'
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 'I'
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // 'J'
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // 'K'
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // 'L'
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // 'M'
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // 'N'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // 'O'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // 'P'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // 'Q'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // 'R'
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // 'S'
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // 'T'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // 'U'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // 'V'
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // 'W'
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // 'X'
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // 'Y'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // 'Z'
    [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110], // '['
    [0b00000, 0b10000, 0b01000, 0b00100, 0b00010, 0b00001, 0b00000], // '\\'
    [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110], // ']'
    [0b00100, 0b01010, 0b10001, 0b00000, 0b00000, 0b00000, 0b00000], // '^'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111], // '_'
    [0b01000, 0b00100, 0b00010, 0b00000, 0b00000, 0b00000, 0b00000], // '`'
    [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111], // 'a'
    [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110], // 'b'
    [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110], // 'c'
    [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111], // 'd'
    [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110], // 'e'
    [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000], // 'f'
    [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110], // 'g'
    [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001], // 'h'
    [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110], // 'i'
    [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100], // 'j'
    [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010], // 'k'
    [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 'l'
    [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001], // 'm'
    [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001], // 'n'
    [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // 'o'
    [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000], // 'p'
    [0b00000, 0b00000, 0b01101, 0b10011, 0b01111, 0b00001, 0b00001], // 'q'
    [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000], // 'r'
    [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110], // 's'
    [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110], // 't'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101], // 'u'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // 'v'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010], // 'w'
    [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001], // 'x'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110], // 'y'
    [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111], // 'z'
    [0b00010, 0b00100, 0b00100, 0b01000, 0b00100, 0b00100, 0b00010], // '{'
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // '|'
    [0b01000, 0b00100, 0b00100, 0b00010, 0b00100, 0b00100, 0b01000], // '}'
    [0b00000, 0b00000, 0b00000, 0b01101, 0b10010, 0b00000, 0b00000], // '~'
];

/// Bitmap rows for a printable ASCII character.
fn glyph_rows(ch: char) -> Option<&'static [u8; GLYPH_ROWS]> {
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) {
        GLYPHS.get((code - 0x20) as usize)
    } else {
        None
    }
}

/// The built-in dot-matrix font.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterFont;

impl RasterFont {
    pub fn new() -> Self {
        RasterFont
    }

    /// Advance in font units.
    fn advance_units(ch: char) -> f64 {
        if glyph_rows(ch).is_some() || ch.is_ascii() {
            ASCII_ADVANCE
        } else {
            WIDE_ADVANCE
        }
    }
}

impl GlyphSource for RasterFont {
    fn has_glyph(&self, ch: char) -> bool {
        ch.is_whitespace() || ch.is_control() || glyph_rows(ch).is_some()
    }

    fn advance(&self, ch: char, font_size: f64) -> f64 {
        Self::advance_units(ch) * font_size / UNITS_PER_EM
    }

    fn add_glyph(&self, ch: char, font_size: f64, x: f64, y: f64, path: &mut PathStorage) {
        let s = font_size / UNITS_PER_EM;
        if ch.is_whitespace() || ch.is_control() {
            return;
        }
        let Some(rows) = glyph_rows(ch) else {
            // Hollow box: the outer square minus a reversed inner square.
            path.rect(x + s, y - 8.0 * s, x + 9.0 * s, y + s);
            path.rect_reversed(x + 2.0 * s, y - 7.0 * s, x + 8.0 * s, y);
            return;
        };
        for (r, &bits) in rows.iter().enumerate() {
            let top = y - (GLYPH_ROWS - r) as f64 * s;
            let bottom = top + s;
            let mut col = 0;
            while col < GLYPH_COLS {
                if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < GLYPH_COLS && bits & (1 << (GLYPH_COLS - 1 - col)) != 0 {
                    col += 1;
                }
                path.rect(x + start as f64 * s, top, x + col as f64 * s, bottom);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer_scanline_aa::RasterizerScanlineAa;
    use crate::trans_affine::TransAffine;

    #[test]
    fn test_advances() {
        let f = RasterFont::new();
        assert_eq!(f.advance('A', 10.0), 6.0);
        assert_eq!(f.advance(' ', 20.0), 12.0);
        assert_eq!(f.advance('仅', 26.0), 26.0);
        assert_eq!(f.measure("AB仅", 10.0), 22.0);
    }

    #[test]
    fn test_has_glyph_covers_ascii_only() {
        let f = RasterFont::new();
        assert!(f.has_glyph('A'));
        assert!(f.has_glyph('~'));
        assert!(f.has_glyph(' '));
        assert!(f.has_glyph('\u{3000}'));
        assert!(!f.has_glyph('仅'));
        assert!(!f.has_glyph('é'));
    }

    #[test]
    fn test_every_printable_glyph_has_ink() {
        let f = RasterFont::new();
        for code in 0x21u8..=0x7E {
            let mut path = PathStorage::new();
            f.add_glyph(code as char, 10.0, 0.0, 0.0, &mut path);
            assert!(!path.is_empty(), "{:?}", code as char);
        }
    }

    #[test]
    fn test_whitespace_has_no_ink() {
        let f = RasterFont::new();
        let mut path = PathStorage::new();
        for ch in [' ', '\t', '\n', '\u{3000}'] {
            f.add_glyph(ch, 10.0, 0.0, 0.0, &mut path);
        }
        assert!(path.is_empty());
    }

    #[test]
    fn test_glyph_sits_on_baseline() {
        let f = RasterFont::new();
        let mut path = PathStorage::new();
        f.add_glyph('H', 20.0, 100.0, 50.0, &mut path);
        assert_eq!(path.bounding_rect(), Some((100.0, 36.0, 110.0, 50.0)));
    }

    #[test]
    fn test_runs_are_merged() {
        // 'T' top row is one 5-dot run, then six single dots.
        let f = RasterFont::new();
        let mut path = PathStorage::new();
        f.add_glyph('T', 10.0, 0.0, 0.0, &mut path);
        let rects = path.contours(&TransAffine::new(), 1.0).len();
        assert_eq!(rects, 7);
    }

    #[test]
    fn test_wide_glyph_is_hollow_box() {
        let f = RasterFont::new();
        let mut path = PathStorage::new();
        f.add_glyph('水', 10.0, 0.0, 10.0, &mut path);
        let mut ras = RasterizerScanlineAa::new(12, 12);
        ras.add_path(&path, &TransAffine::new());
        // Box spans x 1..9 and y 2..11 with a 1px wall.
        assert!(ras.hit_test(1, 5));
        assert!(ras.hit_test(5, 2));
        assert!(!ras.hit_test(5, 6));
        assert!(!ras.hit_test(0, 5));
    }
}
