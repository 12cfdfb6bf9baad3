//! Canvas notifications.
//!
//! A [`CompositeCanvas`](crate::composite_canvas::CompositeCanvas) reports
//! three events to whoever owns it. The receiver is fixed when the canvas is
//! built and dropped when the canvas is destroyed.

use crate::error::WatermarkError;

/// Receiver for canvas notifications. Every method defaults to a no-op.
pub trait CanvasEvents {
    /// The canvas took a new display size. Fired once per successful load.
    fn on_resize(&mut self, _width: u32, _height: u32) {}

    /// A full draw (image plus pattern, or pattern refresh) finished.
    fn on_draw_complete(&mut self) {}

    /// An operation failed; the same error is also returned to the caller.
    fn on_error(&mut self, _error: &WatermarkError) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl CanvasEvents for NoEvents {}

type ResizeFn = Box<dyn FnMut(u32, u32)>;
type DrawFn = Box<dyn FnMut()>;
type ErrorFn = Box<dyn FnMut(&WatermarkError)>;

/// Closure-based [`CanvasEvents`].
///
/// ```
/// use agg_watermark::events::EventCallbacks;
///
/// let events = EventCallbacks::new()
///     .on_resize(|w, h| println!("canvas is now {w}x{h}"))
///     .on_error(|e| eprintln!("{e}"));
/// # drop(events);
/// ```
#[derive(Default)]
pub struct EventCallbacks {
    resize: Option<ResizeFn>,
    draw_complete: Option<DrawFn>,
    error: Option<ErrorFn>,
}

impl EventCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_resize(mut self, f: impl FnMut(u32, u32) + 'static) -> Self {
        self.resize = Some(Box::new(f));
        self
    }

    pub fn on_draw_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.draw_complete = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&WatermarkError) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for EventCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCallbacks")
            .field("resize", &self.resize.is_some())
            .field("draw_complete", &self.draw_complete.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

impl CanvasEvents for EventCallbacks {
    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(f) = self.resize.as_mut() {
            f(width, height);
        }
    }

    fn on_draw_complete(&mut self) {
        if let Some(f) = self.draw_complete.as_mut() {
            f();
        }
    }

    fn on_error(&mut self, error: &WatermarkError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_callbacks_fire() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let mut events = EventCallbacks::new()
            .on_resize(move |w, h| a.borrow_mut().push(format!("resize {w}x{h}")))
            .on_draw_complete(move || b.borrow_mut().push("draw".to_string()))
            .on_error(move |e| c.borrow_mut().push(e.to_string()));

        CanvasEvents::on_resize(&mut events, 3, 4);
        CanvasEvents::on_draw_complete(&mut events);
        CanvasEvents::on_error(&mut events, &ExportError::Destroyed.into());
        assert_eq!(
            *log.borrow(),
            vec![
                "resize 3x4".to_string(),
                "draw".to_string(),
                "Export error: canvas has been destroyed".to_string()
            ]
        );
    }

    #[test]
    fn test_missing_callbacks_are_noops() {
        let mut events = EventCallbacks::new();
        CanvasEvents::on_resize(&mut events, 1, 1);
        CanvasEvents::on_draw_complete(&mut events);
        let mut none = NoEvents;
        none.on_error(&ExportError::NothingDrawn.into());
    }
}
