//! Render thread lifecycle.
//!
//! ```text
//! Created ──► Initializing ──► Running ⇄ Paused
//!                  │              │        │
//!                  └──────────────┴────────┴──► Halting ──► Terminated
//! ```

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Where the render thread is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    /// Spawned, not yet touching the GPU.
    Created,
    /// Building the context, program, buffers and texture.
    Initializing,
    /// Drawing frames.
    Running,
    /// Sleeping until resumed or halted.
    Paused,
    /// Releasing resources.
    Halting,
    /// Done. Nothing is held.
    Terminated,
}

impl RenderState {
    /// Whether `self → next` is a legal step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Initializing | Self::Halting)
                | (Self::Initializing, Self::Running | Self::Halting)
                | (Self::Running, Self::Paused | Self::Halting)
                | (Self::Paused, Self::Running | Self::Halting)
                | (Self::Halting, Self::Terminated)
        )
    }

    /// Whether the thread is done.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Shared, observable render state.
#[derive(Debug)]
pub struct StateCell {
    state: Mutex<RenderState>,
    changed: Condvar,
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCell {
    /// Starts in [`RenderState::Created`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: parking_lot::const_mutex(RenderState::Created),
            changed: Condvar::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> RenderState {
        *self.state.lock()
    }

    /// Moves to `next` if the step is legal. Illegal steps are logged and
    /// ignored. Returns whether the state changed.
    pub fn transition(&self, next: RenderState) -> bool {
        let mut state = self.state.lock();
        if state.can_transition_to(next) {
            tracing::trace!(from = ?*state, to = ?next, "render state");
            *state = next;
            self.changed.notify_all();
            true
        } else {
            tracing::warn!(from = ?*state, to = ?next, "ignored invalid render state transition");
            false
        }
    }

    /// Blocks until `done` holds for the state or `timeout` elapses.
    /// Returns whether it held.
    pub fn wait_until(&self, timeout: Duration, done: impl Fn(RenderState) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !done(*state) {
            if self.changed.wait_until(&mut state, deadline).timed_out() {
                return done(*state);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_happy_path() {
        let cell = StateCell::new();
        for next in [
            RenderState::Initializing,
            RenderState::Running,
            RenderState::Paused,
            RenderState::Running,
            RenderState::Halting,
            RenderState::Terminated,
        ] {
            assert!(cell.transition(next), "to {next:?}");
        }
        assert!(cell.get().is_terminal());
    }

    #[test]
    fn test_invalid_transition_ignored() {
        let cell = StateCell::new();
        assert!(!cell.transition(RenderState::Running));
        assert_eq!(cell.get(), RenderState::Created);
        assert!(cell.transition(RenderState::Halting));
        assert!(!cell.transition(RenderState::Running));
        assert!(cell.transition(RenderState::Terminated));
        assert!(!cell.transition(RenderState::Halting));
    }

    #[test]
    fn test_wait_until_wakes() {
        let cell = Arc::new(StateCell::new());
        let worker = Arc::clone(&cell);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            worker.transition(RenderState::Halting);
            worker.transition(RenderState::Terminated);
        });
        assert!(cell.wait_until(Duration::from_secs(5), RenderState::is_terminal));
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_until_times_out() {
        let cell = StateCell::new();
        assert!(!cell.wait_until(Duration::from_millis(10), RenderState::is_terminal));
    }
}
