//! TrueType font engine using `ttf-parser`.
//!
//! Loads a TTF/OTF face from raw bytes and serves it as a [`GlyphSource`]:
//! advances from `hmtx`, outlines converted into [`PathStorage`] commands
//! scaled to the requested pixel size with y flipped to point down.
//!
//! Characters the face has no mapping for fall back to glyph 0 (`.notdef`),
//! which is what a browser draws for a missing glyph when no fallback font
//! is available.

use crate::error::ConfigError;
use crate::glyph::GlyphSource;
use crate::path_storage::PathStorage;

/// TrueType font engine.
#[derive(Clone)]
pub struct FontEngine {
    face_data: Vec<u8>,
    face_index: u32,
}

impl FontEngine {
    /// Create a font engine from raw TTF/OTF data.
    ///
    /// `face_index` selects the face in a font collection (use 0 for single fonts).
    pub fn from_data(data: Vec<u8>, face_index: u32) -> Result<Self, ConfigError> {
        ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| ConfigError::InvalidFont(e.to_string()))?;
        Ok(Self {
            face_data: data,
            face_index,
        })
    }

    pub fn units_per_em(&self) -> u16 {
        self.face().map(|f| f.units_per_em()).unwrap_or(1000)
    }

    /// Ascender in pixels at `font_size`.
    pub fn ascender(&self, font_size: f64) -> f64 {
        self.face()
            .map(|f| f.ascender() as f64 * font_size / f.units_per_em() as f64)
            .unwrap_or(font_size)
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.face()
            .and_then(|f| f.glyph_index(ch))
            .is_some()
    }

    // -- Internal helpers --

    /// Re-parse the face from the stored data. Parsing only reads the table
    /// directory, so this is cheap; it was validated in `from_data()`.
    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.face_data, self.face_index).ok()
    }

    fn glyph_id(face: &ttf_parser::Face<'_>, ch: char) -> ttf_parser::GlyphId {
        face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0))
    }
}

impl std::fmt::Debug for FontEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontEngine")
            .field("bytes", &self.face_data.len())
            .field("face_index", &self.face_index)
            .finish()
    }
}

impl GlyphSource for FontEngine {
    fn has_glyph(&self, ch: char) -> bool {
        ch.is_whitespace() || FontEngine::has_glyph(self, ch)
    }

    fn advance(&self, ch: char, font_size: f64) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let scale = font_size / face.units_per_em() as f64;
        face.glyph_hor_advance(Self::glyph_id(&face, ch))
            .map(|a| a as f64 * scale)
            .unwrap_or(0.0)
    }

    fn add_glyph(&self, ch: char, font_size: f64, x: f64, y: f64, path: &mut PathStorage) {
        let Some(face) = self.face() else {
            return;
        };
        let mut builder = OutlineCollector {
            path,
            scale: font_size / face.units_per_em() as f64,
            origin_x: x,
            origin_y: y,
        };
        // `None` means no outline, e.g. a space.
        let _ = face.outline_glyph(Self::glyph_id(&face, ch), &mut builder);
    }
}

// ============================================================================
// OutlineCollector — implements ttf_parser::OutlineBuilder
// ============================================================================

/// Appends glyph outline commands to a path, in pixels with y down.
struct OutlineCollector<'a> {
    path: &'a mut PathStorage,
    scale: f64,
    origin_x: f64,
    origin_y: f64,
}

impl OutlineCollector<'_> {
    #[inline]
    fn sx(&self, v: f32) -> f64 {
        self.origin_x + v as f64 * self.scale
    }

    #[inline]
    fn sy(&self, v: f32) -> f64 {
        self.origin_y - v as f64 * self.scale
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.sx(x1), self.sy(y1), self.sx(x), self.sy(y));
        self.path.curve3(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.sx(x1), self.sy(y1));
        let (x2, y2) = (self.sx(x2), self.sy(y2));
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.curve4(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close_polygon();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_storage::PathCommand;

    #[test]
    fn test_rejects_garbage() {
        let err = FontEngine::from_data(vec![0, 1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFont(_)));
        assert!(FontEngine::from_data(Vec::new(), 0).is_err());
    }

    #[test]
    fn test_outline_collector_scales_and_flips() {
        let mut path = PathStorage::new();
        let mut c = OutlineCollector {
            path: &mut path,
            scale: 2.0,
            origin_x: 10.0,
            origin_y: 100.0,
        };
        ttf_parser::OutlineBuilder::move_to(&mut c, 0.0, 0.0);
        ttf_parser::OutlineBuilder::line_to(&mut c, 5.0, 10.0);
        ttf_parser::OutlineBuilder::quad_to(&mut c, 6.0, 12.0, 7.0, 14.0);
        ttf_parser::OutlineBuilder::curve_to(&mut c, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        ttf_parser::OutlineBuilder::close(&mut c);

        let cmds = path.commands();
        assert_eq!(cmds.len(), 5);
        assert_eq!(cmds[0], PathCommand::MoveTo { x: 10.0, y: 100.0 });
        assert_eq!(cmds[1], PathCommand::LineTo { x: 20.0, y: 80.0 });
        assert_eq!(
            cmds[2],
            PathCommand::Curve3 {
                cx: 22.0,
                cy: 76.0,
                x: 24.0,
                y: 72.0
            }
        );
        let PathCommand::Curve4 { x, y, .. } = cmds[3] else {
            panic!("expected a cubic, got {:?}", cmds[3]);
        };
        assert_eq!((x, y), (20.0, 88.0));
        assert_eq!(cmds[4], PathCommand::Close);
    }
}
