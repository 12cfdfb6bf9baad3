//! Display size policy.
//!
//! Large photos are shown scaled down to a maximum width so the canvas
//! stays a reasonable size. Images narrower than the limit keep their
//! natural size; nothing is ever scaled up.

/// Widest display size when no window width is known.
pub const DEFAULT_MAX_WIDTH: u32 = 1200;

/// Horizontal space left around the canvas inside the window.
pub const WINDOW_MARGIN: u32 = 100;

/// Maximum display width for loaded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPolicy {
    pub max_width: u32,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl DisplayPolicy {
    pub fn new(max_width: u32) -> Self {
        Self {
            max_width: max_width.max(1),
        }
    }

    /// `min(window_width - 100, 1200)`, at least one pixel.
    pub fn from_window_width(window_width: u32) -> Self {
        Self::new(
            window_width
                .saturating_sub(WINDOW_MARGIN)
                .min(DEFAULT_MAX_WIDTH),
        )
    }

    /// Display size for an image of natural size `width × height`.
    ///
    /// Wider images are scaled to `max_width` keeping the aspect ratio, with
    /// the height rounded to the nearest pixel and never below one.
    pub fn display_size(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width || width == 0 {
            return (width, height);
        }
        let scale = self.max_width as f64 / width as f64;
        let h = (height as f64 * scale).round().max(1.0) as u32;
        (self.max_width, h)
    }
}
