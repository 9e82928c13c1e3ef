//! Render thread → host messages.
//!
//! Two single-slot channels. Redraw requests coalesce: while one is pending,
//! further requests are dropped. The first-frame message is sent at most once
//! by the render thread, so its slot never fills twice.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Pokes the host event loop so it calls `dispatch`.
pub trait HostWaker: Send + Sync {
    /// Schedules a dispatch on the host thread. Must not block.
    fn wake(&self);
}

/// Messages drained in one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostMessages {
    /// The overlay should be invalidated.
    pub redraw: bool,
    /// The first frame reached the screen.
    pub first_frame: bool,
}

/// Render-thread end of the mailbox.
#[derive(Clone)]
pub struct HostNotifier {
    redraw: Sender<()>,
    first_frame: Sender<()>,
    waker: Option<Arc<dyn HostWaker>>,
}

/// Host end of the mailbox.
#[derive(Debug)]
pub struct HostInbox {
    redraw: Receiver<()>,
    first_frame: Receiver<()>,
}

/// Creates a connected notifier/inbox pair.
#[must_use]
pub fn host_channel(waker: Option<Arc<dyn HostWaker>>) -> (HostNotifier, HostInbox) {
    let (redraw_tx, redraw_rx) = bounded(1);
    let (first_tx, first_rx) = bounded(1);
    (
        HostNotifier {
            redraw: redraw_tx,
            first_frame: first_tx,
            waker,
        },
        HostInbox {
            redraw: redraw_rx,
            first_frame: first_rx,
        },
    )
}

impl HostNotifier {
    /// Asks the host to redraw. Returns false if a request was already
    /// pending or the host is gone.
    pub fn request_redraw(&self) -> bool {
        self.post(&self.redraw)
    }

    /// Tells the host the first frame is on screen.
    pub fn first_frame(&self) -> bool {
        self.post(&self.first_frame)
    }

    fn post(&self, slot: &Sender<()>) -> bool {
        match slot.try_send(()) {
            Ok(()) => {
                if let Some(waker) = &self.waker {
                    waker.wake();
                }
                true
            }
            Err(TrySendError::Full(())) => false,
            Err(TrySendError::Disconnected(())) => {
                tracing::trace!("host inbox dropped");
                false
            }
        }
    }
}

impl std::fmt::Debug for HostNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostNotifier")
            .field("redraw_pending", &self.redraw.len())
            .field("waker", &self.waker.is_some())
            .finish()
    }
}

impl HostInbox {
    /// Takes everything posted since the last drain. Never blocks.
    pub fn drain(&self) -> HostMessages {
        HostMessages {
            redraw: self.redraw.try_recv().is_ok(),
            first_frame: self.first_frame.try_recv().is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingWaker(AtomicUsize);

    impl HostWaker for CountingWaker {
        fn wake(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_redraw_coalesces() {
        let (notifier, inbox) = host_channel(None);
        assert!(notifier.request_redraw());
        assert!(!notifier.request_redraw());
        assert!(!notifier.request_redraw());
        assert_eq!(inbox.drain(), HostMessages { redraw: true, first_frame: false });
        assert_eq!(inbox.drain(), HostMessages::default());
        assert!(notifier.request_redraw());
    }

    #[test]
    fn test_waker_poked_per_delivered_message() {
        let waker = Arc::new(CountingWaker::default());
        let shared: Arc<dyn HostWaker> = waker.clone();
        let (notifier, inbox) = host_channel(Some(shared));
        notifier.request_redraw();
        notifier.request_redraw();
        notifier.first_frame();
        assert_eq!(waker.0.load(Ordering::SeqCst), 2);
        assert_eq!(inbox.drain(), HostMessages { redraw: true, first_frame: true });
    }

    #[test]
    fn test_dropped_inbox() {
        let (notifier, inbox) = host_channel(None);
        drop(inbox);
        assert!(!notifier.request_redraw());
        assert!(!notifier.first_frame());
    }
}
