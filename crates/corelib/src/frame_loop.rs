//! Repeating per-frame task. The platform reschedules a frame after every
//! tick for as long as the loop runs; a `StopHandle` ends it.

use std::cell::Cell;
use std::rc::Rc;

/// Owned by the event loop thread; not `Send`.
#[derive(Debug)]
pub struct FrameLoop {
    running: Rc<Cell<bool>>,
}

/// Cloneable handle that ends the loop after the current frame.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Rc<Cell<bool>>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Rc::clone(&self.running),
        }
    }

    /// Whether the next frame should be scheduled.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    pub fn stop(&self) {
        if self.running.replace(false) {
            log::debug!("Frame loop stopped");
        }
    }

    #[cfg(test)]
    pub(crate) fn is_stopped(&self) -> bool {
        !self.running.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_until_stopped() {
        let frame_loop = FrameLoop::new();
        let handle = frame_loop.stop_handle();
        let other = handle.clone();

        assert!(frame_loop.is_running());
        assert!(!other.is_stopped());

        handle.stop();
        assert!(!frame_loop.is_running());
        assert!(other.is_stopped());

        // stopping twice is harmless
        other.stop();
        assert!(!frame_loop.is_running());
    }
}
