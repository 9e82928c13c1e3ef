//! Compiled dissolve program: simulate pipeline, render pipeline, uniforms.

use crate::error::{RenderError, RenderResult};
use crate::gpu::layout::{DustUniforms, ParticleRecord, WORKGROUP_SIZE};
use crate::gpu::shaders::{DustShaders, FRAGMENT_ENTRY, SIMULATE_ENTRY, VERTEX_ENTRY};

/// Pipelines and bind group layouts for one device.
pub struct DustProgram {
    simulate: wgpu::ComputePipeline,
    render: wgpu::RenderPipeline,
    simulate_layout: wgpu::BindGroupLayout,
    render_layout: wgpu::BindGroupLayout,
    uniforms: wgpu::Buffer,
}

impl DustProgram {
    /// Compiles both modules and builds the pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Program`] with the validation message if
    /// any shader or pipeline fails to build.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> RenderResult<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let simulate_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("dust simulate"),
            source: wgpu::ShaderSource::Wgsl(DustShaders::simulate_source().into()),
        });
        let render_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("dust render"),
            source: wgpu::ShaderSource::Wgsl(DustShaders::render_source().into()),
        });

        let uniform_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(DustUniforms::SIZE as u64),
            },
            count: None,
        };
        let storage_entry = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(ParticleRecord::SIZE as u64),
            },
            count: None,
        };

        let simulate_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dust simulate"),
            entries: &[
                uniform_entry(wgpu::ShaderStages::COMPUTE),
                storage_entry(1, true),
                storage_entry(2, false),
            ],
        });

        let render_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dust render"),
            entries: &[
                uniform_entry(wgpu::ShaderStages::VERTEX_FRAGMENT),
                // Vertex stage reads the texture size for uvs
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let simulate_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("dust simulate"),
            bind_group_layouts: &[&simulate_layout],
            push_constant_ranges: &[],
        });
        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("dust render"),
            bind_group_layouts: &[&render_layout],
            push_constant_ranges: &[],
        });

        let simulate = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("dust simulate"),
            layout: Some(&simulate_pipeline_layout),
            module: &simulate_module,
            entry_point: SIMULATE_ENTRY,
        });

        let render = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("dust render"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_module,
                entry_point: VERTEX_ENTRY,
                buffers: &[ParticleRecord::vertex_layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &render_module,
                entry_point: FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dust uniforms"),
            size: DustUniforms::SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::Program(error.to_string()));
        }

        tracing::debug!("dust program built");
        Ok(Self {
            simulate,
            render,
            simulate_layout,
            render_layout,
            uniforms,
        })
    }

    /// Uploads the uniform block.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &DustUniforms) {
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(uniforms));
    }

    /// Bind group for one simulate direction: read `source`, write `destination`.
    #[must_use]
    pub fn simulate_bind_group(
        &self,
        device: &wgpu::Device,
        source: &wgpu::Buffer,
        destination: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dust simulate"),
            layout: &self.simulate_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: source.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: destination.as_entire_binding(),
                },
            ],
        })
    }

    /// Bind group for the render pass.
    #[must_use]
    pub fn render_bind_group(
        &self,
        device: &wgpu::Device,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dust render"),
            layout: &self.render_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Records the simulate dispatch for `count` particles.
    pub fn simulate<'a>(&'a self, pass: &mut wgpu::ComputePass<'a>, bind_group: &'a wgpu::BindGroup, count: u32) {
        pass.set_pipeline(&self.simulate);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(workgroups_for(count), 1, 1);
    }

    /// Records the instanced draw of `count` particles from `instances`.
    pub fn render<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        bind_group: &'a wgpu::BindGroup,
        instances: &'a wgpu::Buffer,
        count: u32,
    ) {
        pass.set_pipeline(&self.render);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, instances.slice(..));
        pass.draw(0..4, 0..count);
    }

    /// Frees the GPU objects immediately.
    pub fn destroy(&self) {
        self.uniforms.destroy();
    }
}

/// Workgroups needed to cover `count` invocations.
#[must_use]
pub const fn workgroups_for(count: u32) -> u32 {
    count.div_ceil(WORKGROUP_SIZE)
}

impl std::fmt::Debug for DustProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DustProgram").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroups_cover_count() {
        assert_eq!(workgroups_for(0), 0);
        assert_eq!(workgroups_for(1), 1);
        assert_eq!(workgroups_for(64), 1);
        assert_eq!(workgroups_for(65), 2);
        assert_eq!(workgroups_for(250_000), 3_907);
    }
}
