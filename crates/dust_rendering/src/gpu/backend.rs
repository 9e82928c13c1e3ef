//! wgpu implementation of [`RenderBackend`].

use std::marker::PhantomData;
use std::sync::Arc;

use dust_core::{FrameInput, Region};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::backend::{BackendFactory, BackendInit, ReleaseStep, RenderBackend};
use crate::error::{RenderError, RenderResult};
use crate::gpu::buffers::ParticleBuffers;
use crate::gpu::context::GpuContext;
use crate::gpu::layout::DustUniforms;
use crate::gpu::program::DustProgram;
use crate::gpu::texture::SnapshotTexture;

/// The dissolve effect on a real GPU.
#[derive(Debug)]
pub struct WgpuBackend {
    context: GpuContext,
    program: Option<DustProgram>,
    texture: Option<SnapshotTexture>,
    render_bind_group: Option<wgpu::BindGroup>,
    buffers: Option<ParticleBuffers>,
    uniforms: DustUniforms,
}

impl WgpuBackend {
    /// Brings up the context, program, snapshot texture and buffers.
    ///
    /// # Errors
    ///
    /// Any step failing aborts the whole bring-up.
    pub fn new<W>(window: Arc<W>, init: &BackendInit) -> RenderResult<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let context = GpuContext::new(window, init.width, init.height)?;
        let device = context.device()?;
        let queue = context.queue()?;

        let program = DustProgram::new(device, context.format())?;
        let texture = SnapshotTexture::upload(device, queue, &init.snapshot, context.max_texture_dimension())?;
        let render_bind_group = program.render_bind_group(device, texture.view(), texture.sampler());
        let buffers = ParticleBuffers::allocate(device, &program, init.budget.count)?;

        let mut uniforms = DustUniforms::new(
            init.width,
            init.height,
            &init.regions,
            init.budget.diameter,
            init.seed,
        );
        uniforms.particle_count = init.budget.count;
        program.write_uniforms(queue, &uniforms);

        tracing::info!(
            width = init.width,
            height = init.height,
            particles = init.budget.count,
            diameter = init.budget.diameter,
            "wgpu backend ready"
        );

        Ok(Self {
            context,
            program: Some(program),
            texture: Some(texture),
            render_bind_group: Some(render_bind_group),
            buffers: Some(buffers),
            uniforms,
        })
    }
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.context.resize(width, height)?;
        self.uniforms.set_size(width, height);
        Ok(())
    }

    fn update_layout(&mut self, regions: &[Region], diameter: u32) -> RenderResult<()> {
        self.context.device()?;
        self.uniforms.set_layout(regions, diameter);
        Ok(())
    }

    fn reallocate(&mut self, capacity: u32) -> RenderResult<()> {
        let program = self.program.as_ref().ok_or(RenderError::Released("program"))?;
        if let Some(old) = self.buffers.take() {
            old.destroy();
        }
        self.buffers = Some(ParticleBuffers::allocate(self.context.device()?, program, capacity)?);
        Ok(())
    }

    fn draw(&mut self, frame: &FrameInput) -> RenderResult<()> {
        let Self {
            context,
            program,
            render_bind_group,
            buffers,
            uniforms,
            ..
        } = self;
        let program = program.as_ref().ok_or(RenderError::Released("program"))?;
        let render_bind_group = render_bind_group.as_ref().ok_or(RenderError::Released("program"))?;
        let buffers = buffers.as_mut().ok_or(RenderError::Released("particle buffers"))?;

        uniforms.time = frame.time;
        uniforms.delta_time = frame.delta_time;
        uniforms.init = u32::from(frame.init);
        uniforms.particle_count = frame.particle_count.min(buffers.capacity());
        let count = uniforms.particle_count;

        let output = context.acquire()?;
        let device = context.device()?;
        let queue = context.queue()?;
        program.write_uniforms(queue, uniforms);

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("dust frame"),
        });

        if count > 0 {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("dust simulate"),
                timestamp_writes: None,
            });
            program.simulate(&mut pass, buffers.simulate_bind_group(), count);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("dust render"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if count > 0 {
                program.render(&mut pass, render_bind_group, buffers.current(), count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        output.present();
        buffers.swap();
        Ok(())
    }

    fn poll_errors(&mut self) -> Vec<String> {
        self.context.drain_errors()
    }

    fn release(&mut self, step: ReleaseStep) -> RenderResult<()> {
        match step {
            ReleaseStep::ParticleBuffers => self
                .buffers
                .take()
                .map(ParticleBuffers::destroy)
                .ok_or(RenderError::Released(step.name())),
            ReleaseStep::Program => {
                self.render_bind_group = None;
                self.program
                    .take()
                    .map(|program| program.destroy())
                    .ok_or(RenderError::Released(step.name()))
            }
            ReleaseStep::SnapshotTexture => self
                .texture
                .take()
                .map(|texture| texture.destroy())
                .ok_or(RenderError::Released(step.name())),
            ReleaseStep::Surface => self.context.release_surface(),
            ReleaseStep::Context => self.context.release(),
        }
    }
}

/// Builds a [`WgpuBackend`] for any window `W` that exposes raw handles.
pub struct WgpuBackendFactory<W> {
    _window: PhantomData<fn() -> W>,
}

impl<W> WgpuBackendFactory<W> {
    /// Creates the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self { _window: PhantomData }
    }
}

impl<W> Default for WgpuBackendFactory<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> std::fmt::Debug for WgpuBackendFactory<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WgpuBackendFactory")
    }
}

impl<W> BackendFactory for WgpuBackendFactory<W>
where
    W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
{
    type Surface = Arc<W>;
    type Backend = WgpuBackend;

    fn create(&mut self, surface: Self::Surface, init: &BackendInit) -> RenderResult<Self::Backend> {
        WgpuBackend::new(surface, init)
    }
}
