/// Pointer capture bookkeeping for drag gestures
///
/// While a drag is active the widget listens to pointer events anywhere
/// in the window, not only over itself. A `PointerCapture` is the handle
/// for that registration: it is acquired when the drag starts and the
/// registration is released when the handle is dropped, whichever way
/// the drag ends.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

/// Counts the global listener registrations currently held
#[derive(Debug, Clone, Default)]
pub struct CaptureRegistry {
    active: Rc<Cell<usize>>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register global move/end listeners
    pub fn acquire(&self) -> PointerCapture {
        self.active.set(self.active.get() + 1);
        trace!(active = self.active.get(), "pointer capture acquired");
        PointerCapture {
            active: Rc::clone(&self.active),
        }
    }

    /// Number of live captures
    pub fn active(&self) -> usize {
        self.active.get()
    }
}

/// A held global listener registration
#[derive(Debug)]
pub struct PointerCapture {
    active: Rc<Cell<usize>>,
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        self.active.set(self.active.get().saturating_sub(1));
        trace!(active = self.active.get(), "pointer capture released");
    }
}
