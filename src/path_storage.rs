//! Path storage — the vertex container fed to the rasterizer.
//!
//! Stores path commands as a typed enum instead of AGG's
//! `(x, y, cmd)` vertex triples. Glyph outlines (raster font rectangles or
//! TrueType quadratic/cubic contours) are accumulated here in text space and
//! flattened to device-space polygons with [`PathStorage::contours`].

use crate::curves::{Curve3Inc, Curve4Inc};
use crate::trans_affine::TransAffine;

/// One path command. Curve commands continue from the current point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    Curve3 {
        cx: f64,
        cy: f64,
        x: f64,
        y: f64,
    },
    Curve4 {
        cx1: f64,
        cy1: f64,
        cx2: f64,
        cy2: f64,
        x: f64,
        y: f64,
    },
    Close,
}

/// A flattened, closed polygon in device coordinates.
pub type Contour = Vec<(f64, f64)>;

/// Path storage — an ordered list of sub-paths.
#[derive(Debug, Clone, Default)]
pub struct PathStorage {
    commands: Vec<PathCommand>,
}

impl PathStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all commands (keeps allocated memory).
    pub fn remove_all(&mut self) {
        self.commands.clear();
    }

    // ---------------------------------------------------------------
    // Path construction
    // ---------------------------------------------------------------

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::LineTo { x, y });
    }

    /// Quadratic Bezier from the current point.
    pub fn curve3(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.commands.push(PathCommand::Curve3 {
            cx: x_ctrl,
            cy: y_ctrl,
            x: x_to,
            y: y_to,
        });
    }

    /// Cubic Bezier from the current point.
    #[allow(clippy::too_many_arguments)]
    pub fn curve4(
        &mut self,
        x_ctrl1: f64,
        y_ctrl1: f64,
        x_ctrl2: f64,
        y_ctrl2: f64,
        x_to: f64,
        y_to: f64,
    ) {
        self.commands.push(PathCommand::Curve4 {
            cx1: x_ctrl1,
            cy1: y_ctrl1,
            cx2: x_ctrl2,
            cy2: y_ctrl2,
            x: x_to,
            y: y_to,
        });
    }

    pub fn close_polygon(&mut self) {
        if !matches!(self.commands.last(), None | Some(PathCommand::Close)) {
            self.commands.push(PathCommand::Close);
        }
    }

    /// Closed axis-aligned rectangle, wound clockwise on a y-down screen.
    pub fn rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.move_to(x1, y1);
        self.line_to(x2, y1);
        self.line_to(x2, y2);
        self.line_to(x1, y2);
        self.close_polygon();
    }

    /// Closed rectangle wound the other way, for cutting holes under the
    /// non-zero rule.
    pub fn rect_reversed(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.move_to(x1, y1);
        self.line_to(x1, y2);
        self.line_to(x2, y2);
        self.line_to(x2, y1);
        self.close_polygon();
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn total_commands(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Bounds of all points, control points included, as `(x1, y1, x2, y2)`.
    pub fn bounding_rect(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        let mut add = |x: f64, y: f64| {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
            });
        };
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => add(x, y),
                PathCommand::Curve3 { cx, cy, x, y } => {
                    add(cx, cy);
                    add(x, y);
                }
                PathCommand::Curve4 {
                    cx1,
                    cy1,
                    cx2,
                    cy2,
                    x,
                    y,
                } => {
                    add(cx1, cy1);
                    add(cx2, cy2);
                    add(x, y);
                }
                PathCommand::Close => {}
            }
        }
        bounds
    }

    // ---------------------------------------------------------------
    // Flattening
    // ---------------------------------------------------------------

    /// Transform every point by `mtx` and flatten curves into polygons.
    ///
    /// Each sub-path becomes one implicitly closed contour; sub-paths with
    /// fewer than three vertices are dropped since they enclose no area.
    /// `approximation_scale` multiplies the curve step count.
    pub fn contours(&self, mtx: &TransAffine, approximation_scale: f64) -> Vec<Contour> {
        let mut out = Vec::new();
        let mut current: Contour = Vec::new();
        let mut last = (0.0, 0.0);

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo { x, y } => {
                    finish(&mut current, &mut out);
                    last = mtx.transform_point(x, y);
                    current.push(last);
                }
                PathCommand::LineTo { x, y } => {
                    if current.is_empty() {
                        current.push(last);
                    }
                    last = mtx.transform_point(x, y);
                    current.push(last);
                }
                PathCommand::Curve3 { cx, cy, x, y } => {
                    if current.is_empty() {
                        current.push(last);
                    }
                    let (cx, cy) = mtx.transform_point(cx, cy);
                    let (ex, ey) = mtx.transform_point(x, y);
                    let curve =
                        Curve3Inc::new(last.0, last.1, cx, cy, ex, ey, approximation_scale);
                    current.extend(curve.skip(1));
                    last = (ex, ey);
                }
                PathCommand::Curve4 {
                    cx1,
                    cy1,
                    cx2,
                    cy2,
                    x,
                    y,
                } => {
                    if current.is_empty() {
                        current.push(last);
                    }
                    let (c1x, c1y) = mtx.transform_point(cx1, cy1);
                    let (c2x, c2y) = mtx.transform_point(cx2, cy2);
                    let (ex, ey) = mtx.transform_point(x, y);
                    let curve = Curve4Inc::new(
                        last.0,
                        last.1,
                        c1x,
                        c1y,
                        c2x,
                        c2y,
                        ex,
                        ey,
                        approximation_scale,
                    );
                    current.extend(curve.skip(1));
                    last = (ex, ey);
                }
                PathCommand::Close => {
                    if let Some(&first) = current.first() {
                        last = first;
                    }
                    finish(&mut current, &mut out);
                }
            }
        }
        finish(&mut current, &mut out);
        out
    }
}

fn finish(current: &mut Contour, out: &mut Vec<Contour>) {
    if current.len() >= 3 {
        out.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_builds_one_contour() {
        let mut ps = PathStorage::new();
        ps.rect(1.0, 2.0, 5.0, 7.0);
        assert_eq!(ps.total_commands(), 5);
        let contours = ps.contours(&TransAffine::new(), 1.0);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0],
            vec![(1.0, 2.0), (5.0, 2.0), (5.0, 7.0), (1.0, 7.0)]
        );
    }

    #[test]
    fn test_close_polygon_is_not_doubled() {
        let mut ps = PathStorage::new();
        ps.close_polygon();
        assert!(ps.is_empty());
        ps.move_to(0.0, 0.0);
        ps.line_to(1.0, 0.0);
        ps.close_polygon();
        ps.close_polygon();
        assert_eq!(ps.total_commands(), 3);
    }

    #[test]
    fn test_degenerate_subpaths_dropped() {
        let mut ps = PathStorage::new();
        ps.move_to(0.0, 0.0);
        ps.line_to(3.0, 3.0);
        ps.move_to(0.0, 0.0);
        ps.line_to(4.0, 0.0);
        ps.line_to(4.0, 4.0);
        let contours = ps.contours(&TransAffine::new(), 1.0);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 3);
    }

    #[test]
    fn test_contours_are_transformed() {
        let mut ps = PathStorage::new();
        ps.rect(0.0, 0.0, 2.0, 1.0);
        let mtx = TransAffine::new_scaling(10.0, 10.0) * TransAffine::new_translation(5.0, 0.0);
        let contours = ps.contours(&mtx, 1.0);
        assert_eq!(contours[0][2], (25.0, 10.0));
    }

    #[test]
    fn test_curves_are_flattened() {
        let mut ps = PathStorage::new();
        ps.move_to(0.0, 0.0);
        ps.curve3(50.0, 100.0, 100.0, 0.0);
        ps.curve4(100.0, -50.0, 0.0, -50.0, 0.0, 0.0);
        ps.close_polygon();
        let contours = ps.contours(&TransAffine::new(), 1.0);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].len() > 10);
        assert!(contours[0].contains(&(100.0, 0.0)));
    }

    #[test]
    fn test_bounding_rect() {
        let mut ps = PathStorage::new();
        assert_eq!(ps.bounding_rect(), None);
        ps.move_to(3.0, 4.0);
        ps.curve3(-1.0, 10.0, 6.0, 2.0);
        assert_eq!(ps.bounding_rect(), Some((-1.0, 2.0, 6.0, 10.0)));
    }
}
