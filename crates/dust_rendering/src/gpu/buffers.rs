//! Ping-pong particle buffers.
//!
//! ```text
//!   frame N:    simulate  [A] ──► [B]    draw from A
//!   frame N+1:  simulate  [B] ──► [A]    draw from B
//! ```
//!
//! One simulate bind group per direction, built once per allocation, so a
//! swap is an index flip.

use dust_core::PingPong;

use crate::error::{RenderError, RenderResult};
use crate::gpu::layout::ParticleRecord;
use crate::gpu::program::DustProgram;

/// Two equally sized particle buffers with alternating roles.
pub struct ParticleBuffers {
    buffers: PingPong<wgpu::Buffer>,
    bind_groups: [wgpu::BindGroup; 2],
    capacity: u32,
}

impl ParticleBuffers {
    /// Allocates both buffers for `capacity` particles (at least one).
    ///
    /// Contents are undefined until an init frame seeds them.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::OutOfMemory`] if the device cannot back them.
    pub fn allocate(device: &wgpu::Device, program: &DustProgram, capacity: u32) -> RenderResult<Self> {
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffers = PingPong::new(
            Self::create_buffer(device, "dust particles A", capacity),
            Self::create_buffer(device, "dust particles B", capacity),
        );
        if pollster::block_on(device.pop_error_scope()).is_some() {
            return Err(RenderError::OutOfMemory);
        }

        let bind_groups = [
            program.simulate_bind_group(device, buffers.current(), buffers.feedback()),
            program.simulate_bind_group(device, buffers.feedback(), buffers.current()),
        ];

        tracing::debug!(capacity, bytes = ParticleRecord::buffer_size(capacity), "particle buffers allocated");
        Ok(Self {
            buffers,
            bind_groups,
            capacity,
        })
    }

    fn create_buffer(device: &wgpu::Device, label: &str, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: ParticleRecord::buffer_size(capacity),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        })
    }

    /// Particles each buffer holds.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Buffer read this frame (instance source and simulate input).
    #[must_use]
    pub fn current(&self) -> &wgpu::Buffer {
        self.buffers.current()
    }

    /// Simulate bind group for this frame's direction.
    #[must_use]
    pub fn simulate_bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_groups[self.buffers.current_index()]
    }

    /// Flips roles after a frame.
    pub fn swap(&mut self) {
        self.buffers.swap();
    }

    /// Frees both buffers immediately.
    pub fn destroy(self) {
        for buffer in self.buffers.into_inner() {
            buffer.destroy();
        }
    }
}

impl std::fmt::Debug for ParticleBuffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleBuffers")
            .field("capacity", &self.capacity)
            .field("current", &self.buffers.current_index())
            .finish_non_exhaustive()
    }
}
