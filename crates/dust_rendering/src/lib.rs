//! # DUST Rendering
//!
//! The GPU half of the dissolve effect:
//! - A WGSL program that simulates particles in a compute pass and draws
//!   them as instanced quads sampled from the snapshot
//! - A wgpu backend that owns context, buffers and texture
//! - The render thread that paces frames and talks back to the host
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RENDER THREAD                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BackendFactory::create  →  RenderBackend                   │
//! │        ↓                        ↓                           │
//! │  FrameLoop: pace → resize → draw → notify host              │
//! │        ↓                                                    │
//! │  release_all: buffers → program → texture → surface → ctx   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - The GPU context never leaves the render thread
//! - The host thread never waits on the render thread
//! - Particles never exist on the CPU

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod error;
pub mod gpu;
pub mod thread;

pub use backend::{BackendFactory, BackendInit, ReleaseStep, RenderBackend};
pub use error::{RenderError, RenderResult};
pub use gpu::{WgpuBackend, WgpuBackendFactory};
pub use thread::{
    host_channel, HostInbox, HostMessages, HostNotifier, HostWaker, RenderJob, RenderSettings, RenderState,
    RenderThread, RenderThreadHandle,
};
