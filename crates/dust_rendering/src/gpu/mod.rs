//! # GPU Program
//!
//! The dissolve effect on wgpu. Everything here lives on the render thread.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ONE FRAME                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  write uniforms (time, Δt, init, count)                     │
//! │       ↓                                                     │
//! │  compute: simulate   current ──► feedback                   │
//! │       ↓                                                     │
//! │  render: 4-vertex strip × count instances from current      │
//! │       ↓                                                     │
//! │  present, swap current ⇄ feedback                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod buffers;
pub mod context;
pub mod layout;
pub mod program;
pub mod shaders;
pub mod texture;

pub use backend::{WgpuBackend, WgpuBackendFactory};
pub use context::GpuContext;
pub use layout::{DustUniforms, ParticleRecord, MAX_REGIONS, WORKGROUP_SIZE};
pub use shaders::DustShaders;
