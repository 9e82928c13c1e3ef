//! Seam between the render thread and the GPU.
//!
//! The render thread only ever talks to a [`RenderBackend`]. The backend is
//! built on the render thread by a [`BackendFactory`], which is the only
//! piece that crosses threads, so a backend never has to be `Send`.

use std::sync::Arc;

use dust_core::{FrameInput, ParticleBudget, Region, Snapshot};

use crate::error::RenderResult;

/// Everything a backend needs to come up.
#[derive(Debug, Clone)]
pub struct BackendInit {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Image the particles sample from.
    pub snapshot: Arc<Snapshot>,
    /// Quantized regions.
    pub regions: Vec<Region>,
    /// Initial diameter and particle count.
    pub budget: ParticleBudget,
    /// Session seed in [0, 1), quantized to 1/256.
    pub seed: f32,
}

/// One step of teardown. Steps run in [`ReleaseStep::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseStep {
    /// Both particle buffers.
    ParticleBuffers,
    /// Pipelines, layouts and bind groups.
    Program,
    /// Snapshot texture and sampler.
    SnapshotTexture,
    /// The presentation surface.
    Surface,
    /// Device and queue.
    Context,
}

impl ReleaseStep {
    /// Teardown order.
    pub const ALL: [Self; 5] = [
        Self::ParticleBuffers,
        Self::Program,
        Self::SnapshotTexture,
        Self::Surface,
        Self::Context,
    ];

    /// Short name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ParticleBuffers => "particle buffers",
            Self::Program => "program",
            Self::SnapshotTexture => "snapshot texture",
            Self::Surface => "surface",
            Self::Context => "context",
        }
    }
}

/// GPU side of one effect session. Lives on the render thread only.
pub trait RenderBackend {
    /// Reconfigures the surface and viewport and updates the size uniform.
    ///
    /// # Errors
    ///
    /// Fails if the backend was already released.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Re-uploads region rects and the cell diameter.
    ///
    /// # Errors
    ///
    /// Fails if the backend was already released.
    fn update_layout(&mut self, regions: &[Region], diameter: u32) -> RenderResult<()>;

    /// Replaces both particle buffers with `capacity`-sized ones.
    ///
    /// # Errors
    ///
    /// Fails if allocation fails or the backend was already released.
    fn reallocate(&mut self, capacity: u32) -> RenderResult<()>;

    /// Simulates, draws and presents one frame, then swaps the buffers.
    ///
    /// # Errors
    ///
    /// [`RenderError::SurfaceLost`](crate::RenderError::SurfaceLost) and
    /// [`RenderError::Timeout`](crate::RenderError::Timeout) mean the frame
    /// was skipped; any other error ends the session.
    fn draw(&mut self, frame: &FrameInput) -> RenderResult<()>;

    /// Drains GPU errors raised since the last call.
    fn poll_errors(&mut self) -> Vec<String>;

    /// Releases one group of resources.
    ///
    /// # Errors
    ///
    /// Reports a failed or repeated release. Other steps are unaffected.
    fn release(&mut self, step: ReleaseStep) -> RenderResult<()>;
}

/// Builds a backend on the render thread.
pub trait BackendFactory: Send + 'static {
    /// Platform surface handed over by the host.
    type Surface: Send + 'static;
    /// Backend produced.
    type Backend: RenderBackend;

    /// Acquires the GPU, builds the program and uploads the initial state.
    ///
    /// # Errors
    ///
    /// Any failure here ends the session before the first frame.
    fn create(&mut self, surface: Self::Surface, init: &BackendInit) -> RenderResult<Self::Backend>;
}
