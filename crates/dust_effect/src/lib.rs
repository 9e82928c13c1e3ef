//! # DUST Effect
//!
//! Host-facing entry point of the dissolve effect. A host hands over a
//! snapshot of its view and the regions to dissolve; the effect lays a
//! transparent overlay on top, renders particles on a dedicated thread,
//! and removes itself after a fixed wall-clock budget.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        HOST THREAD                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DustEffect::start → HostView::attach_overlay               │
//! │                    → HostView::post_delayed(watchdog)       │
//! │  DustEffect::dispatch ← mailbox (redraw, first frame)       │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │ SurfaceListener
//! ┌──────────────────────────▼──────────────────────────────────┐
//! │  RenderThread (dust_rendering)                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let request = EffectRequest::new(snapshot, vec![Region::new(0, 0, 320, 48)]);
//! let effect = DustEffect::start(host, WgpuBackendFactory::new(), request, || {
//!     hide_source_view();
//! })?;
//! // On every host waker tick:
//! effect.dispatch();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod controller;
pub mod error;
pub mod host;

pub use controller::{DustEffect, EffectRequest, FirstFrameCallback};
pub use error::StartError;
pub use host::{DelayedTask, HostView, OverlayId, SurfaceListener};
