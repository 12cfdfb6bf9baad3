//! Bezier curve flatteners (quadratic and cubic).
//!
//! The incremental forward-differencing algorithm of AGG's `curve3_inc` and
//! `curve4_inc`. Glyph outlines are small and evenly curved, so the
//! subdivision flatteners are not needed.
//!
//! Both flatteners are iterators over the polyline vertices, from the start
//! point to the end point inclusive.

use crate::basics::uround;

/// Lower bound on the number of segments per curve.
const MIN_STEPS: i32 = 4;

// ============================================================================
// Curve3Inc — incremental quadratic Bezier
// ============================================================================

/// Incremental quadratic Bezier curve flattener using forward differences.
#[derive(Debug, Clone)]
pub struct Curve3Inc {
    num_steps: i32,
    step: i32,
    start: (f64, f64),
    end: (f64, f64),
    fx: f64,
    fy: f64,
    dfx: f64,
    dfy: f64,
    ddfx: f64,
    ddfy: f64,
}

impl Curve3Inc {
    /// `scale` is the approximation scale: the device-space magnification of
    /// the control points, so that larger curves get more segments.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, scale: f64) -> Self {
        let dx1 = x2 - x1;
        let dy1 = y2 - y1;
        let dx2 = x3 - x2;
        let dy2 = y3 - y2;

        let len = (dx1 * dx1 + dy1 * dy1).sqrt() + (dx2 * dx2 + dy2 * dy2).sqrt();
        let num_steps = (uround(len * 0.25 * scale) as i32).max(MIN_STEPS);

        let subdivide_step = 1.0 / num_steps as f64;
        let subdivide_step2 = subdivide_step * subdivide_step;

        let tmpx = (x1 - x2 * 2.0 + x3) * subdivide_step2;
        let tmpy = (y1 - y2 * 2.0 + y3) * subdivide_step2;

        Self {
            num_steps,
            step: num_steps,
            start: (x1, y1),
            end: (x3, y3),
            fx: x1,
            fy: y1,
            dfx: tmpx + dx1 * (2.0 * subdivide_step),
            dfy: tmpy + dy1 * (2.0 * subdivide_step),
            ddfx: tmpx * 2.0,
            ddfy: tmpy * 2.0,
        }
    }

    pub fn num_steps(&self) -> u32 {
        self.num_steps as u32
    }
}

impl Iterator for Curve3Inc {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<(f64, f64)> {
        if self.step < 0 {
            return None;
        }
        let p = if self.step == self.num_steps {
            self.start
        } else if self.step == 0 {
            self.end
        } else {
            self.fx += self.dfx;
            self.fy += self.dfy;
            self.dfx += self.ddfx;
            self.dfy += self.ddfy;
            (self.fx, self.fy)
        };
        self.step -= 1;
        Some(p)
    }
}

// ============================================================================
// Curve4Inc — incremental cubic Bezier
// ============================================================================

/// Incremental cubic Bezier curve flattener using forward differences.
#[derive(Debug, Clone)]
pub struct Curve4Inc {
    num_steps: i32,
    step: i32,
    start: (f64, f64),
    end: (f64, f64),
    fx: f64,
    fy: f64,
    dfx: f64,
    dfy: f64,
    ddfx: f64,
    ddfy: f64,
    dddfx: f64,
    dddfy: f64,
}

impl Curve4Inc {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
        x4: f64,
        y4: f64,
        scale: f64,
    ) -> Self {
        let dx1 = x2 - x1;
        let dy1 = y2 - y1;
        let dx2 = x3 - x2;
        let dy2 = y3 - y2;
        let dx3 = x4 - x3;
        let dy3 = y4 - y3;

        let len = ((dx1 * dx1 + dy1 * dy1).sqrt()
            + (dx2 * dx2 + dy2 * dy2).sqrt()
            + (dx3 * dx3 + dy3 * dy3).sqrt())
            * 0.25
            * scale;
        let num_steps = (uround(len) as i32).max(MIN_STEPS);

        let subdivide_step = 1.0 / num_steps as f64;
        let subdivide_step2 = subdivide_step * subdivide_step;
        let subdivide_step3 = subdivide_step2 * subdivide_step;

        let pre1 = 3.0 * subdivide_step;
        let pre2 = 3.0 * subdivide_step2;
        let pre4 = 6.0 * subdivide_step2;
        let pre5 = 6.0 * subdivide_step3;

        let tmp1x = x1 - x2 * 2.0 + x3;
        let tmp1y = y1 - y2 * 2.0 + y3;

        let tmp2x = (x2 - x3) * 3.0 - x1 + x4;
        let tmp2y = (y2 - y3) * 3.0 - y1 + y4;

        Self {
            num_steps,
            step: num_steps,
            start: (x1, y1),
            end: (x4, y4),
            fx: x1,
            fy: y1,
            dfx: dx1 * pre1 + tmp1x * pre2 + tmp2x * subdivide_step3,
            dfy: dy1 * pre1 + tmp1y * pre2 + tmp2y * subdivide_step3,
            ddfx: tmp1x * pre4 + tmp2x * pre5,
            ddfy: tmp1y * pre4 + tmp2y * pre5,
            dddfx: tmp2x * pre5,
            dddfy: tmp2y * pre5,
        }
    }

    pub fn num_steps(&self) -> u32 {
        self.num_steps as u32
    }
}

impl Iterator for Curve4Inc {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<(f64, f64)> {
        if self.step < 0 {
            return None;
        }
        let p = if self.step == self.num_steps {
            self.start
        } else if self.step == 0 {
            self.end
        } else {
            self.fx += self.dfx;
            self.fy += self.dfy;
            self.dfx += self.ddfx;
            self.dfy += self.ddfy;
            self.ddfx += self.dddfx;
            self.ddfy += self.dddfy;
            (self.fx, self.fy)
        };
        self.step -= 1;
        Some(p)
    }
}

// ============================================================================
// Tests
// ============================================================================
