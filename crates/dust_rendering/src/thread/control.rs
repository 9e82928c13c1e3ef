//! Flags the host sets and the render thread polls.
//!
//! Reads are allowed to be one frame stale.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// A resize the render thread has not applied yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeRequest {
    /// New width in pixels.
    pub width: u32,
    /// New height in pixels.
    pub height: u32,
    /// Set by the host, cleared when the render thread takes it.
    pub pending: bool,
}

/// Running, paused and resize state shared with the host.
#[derive(Debug)]
pub struct RenderControl {
    running: AtomicBool,
    paused: AtomicBool,
    resize: Mutex<ResizeRequest>,
}

impl Default for RenderControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderControl {
    /// Running, not paused, no resize pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            resize: parking_lot::const_mutex(ResizeRequest {
                width: 0,
                height: 0,
                pending: false,
            }),
        }
    }

    /// Whether the loop should keep going.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Asks the loop to stop. Idempotent.
    pub fn halt(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether the loop should idle.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pauses or resumes the loop.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    /// Records a new target size. A later request replaces an earlier one.
    pub fn request_resize(&self, width: u32, height: u32) {
        *self.resize.lock() = ResizeRequest {
            width,
            height,
            pending: true,
        };
    }

    /// Takes the pending resize, if any, and clears it.
    pub fn take_resize(&self) -> Option<(u32, u32)> {
        let mut request = self.resize.lock();
        if request.pending {
            request.pending = false;
            Some((request.width, request.height))
        } else {
            None
        }
    }
}
