//! # Render Thread
//!
//! One dedicated thread per effect owns the GPU backend from creation to
//! release. The host only ever touches the shared control block and the
//! mailbox.
//!
//! ```text
//!   HOST THREAD                         RENDER THREAD
//!   ───────────                         ─────────────
//!   RenderThreadHandle ── control ────► FrameLoop
//!     halt / pause / resize  (atomics,    │ backend.draw()
//!                             mutex)      │
//!   HostInbox ◄──────────── mailbox ──────┘ redraw, first frame
//!     dispatch()           (bounded(1))
//! ```

pub mod control;
pub mod frame_loop;
pub mod mailbox;
pub mod render_thread;
pub mod state;

pub use control::{RenderControl, ResizeRequest};
pub use frame_loop::{release_all, FrameLoop, LoopExit, LoopHandles, RenderSettings};
pub use mailbox::{host_channel, HostInbox, HostMessages, HostNotifier, HostWaker};
pub use render_thread::{session_seed, RenderJob, RenderThread, RenderThreadHandle, RENDER_THREAD_NAME};
pub use state::{RenderState, StateCell};
