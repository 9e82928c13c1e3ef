//! GPU record layouts shared by the host and the WGSL program.
//!
//! Both structs are `#[repr(C)]` and `Pod`; their byte layout is the
//! contract with `shaders.rs`. The size tests below pin it.

use bytemuck::{Pod, Zeroable};
use dust_core::Region;

/// Region slots in the uniform block.
pub const MAX_REGIONS: usize = 64;

/// Threads per simulate workgroup. Must match `@workgroup_size` in WGSL.
pub const WORKGROUP_SIZE: u32 = 64;

/// One particle (lives entirely on GPU).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleRecord {
    /// Position in surface pixels.
    pub position: [f32; 2],
    /// Velocity in pixels per simulated second.
    pub velocity: [f32; 2],
    /// Simulated seconds since release. Negative while waiting to release.
    pub age: f32,
    /// Seconds from release to fully faded.
    pub duration: f32,
}

impl ParticleRecord {
    /// Size of a particle in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // velocity
        2 => Float32,   // age
        3 => Float32,   // duration
    ];

    /// Instance-rate vertex layout: one record per particle quad.
    #[must_use]
    pub const fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Buffer size for `capacity` particles. Never zero.
    #[must_use]
    pub fn buffer_size(capacity: u32) -> wgpu::BufferAddress {
        u64::from(capacity.max(1)) * Self::SIZE as u64
    }
}

/// The uniform block read by both passes.
///
/// Mirrors `DustUniforms` in WGSL, 16-byte aligned for uniform layout rules.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DustUniforms {
    /// Surface size in pixels.
    pub size: [f32; 2],
    /// Accumulated simulation time.
    pub time: f32,
    /// Scaled delta for this frame.
    pub delta_time: f32,
    /// 1 on frames that seed particles from their cells.
    pub init: u32,
    /// Cell edge length in pixels.
    pub diameter: u32,
    /// Per-session random seed in [0, 1).
    pub seed: f32,
    /// Number of valid entries in `regions`.
    pub region_count: u32,
    /// Particles to simulate and draw.
    pub particle_count: u32,
    /// Padding to the 16-byte boundary of `regions`.
    pub _padding: [u32; 3],
    /// `[left, top, width, height]` per region.
    pub regions: [[i32; 4]; MAX_REGIONS],
}

impl DustUniforms {
    /// Size of the block in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds the block for a new session. `init` starts armed.
    #[must_use]
    pub fn new(width: u32, height: u32, regions: &[Region], diameter: u32, seed: f32) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_size(width, height);
        uniforms.set_layout(regions, diameter);
        uniforms.seed = seed;
        uniforms.init = 1;
        uniforms
    }

    /// Sets the surface size. Zero dimensions are clamped to one.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = [width.max(1) as f32, height.max(1) as f32];
    }

    /// Uploads region rects and diameter. Regions past [`MAX_REGIONS`] are
    /// ignored.
    pub fn set_layout(&mut self, regions: &[Region], diameter: u32) {
        self.diameter = diameter.max(1);
        self.regions = [[0; 4]; MAX_REGIONS];
        let used = regions.len().min(MAX_REGIONS);
        for (slot, region) in self.regions.iter_mut().zip(&regions[..used]) {
            *slot = region.to_array();
        }
        self.region_count = used as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_size() {
        assert_eq!(ParticleRecord::SIZE, 24);
        assert_eq!(std::mem::offset_of!(ParticleRecord, velocity), 8);
        assert_eq!(std::mem::offset_of!(ParticleRecord, age), 16);
        assert_eq!(std::mem::offset_of!(ParticleRecord, duration), 20);
    }

    #[test]
    fn test_vertex_layout_offsets() {
        let layout = ParticleRecord::vertex_layout();
        assert_eq!(layout.array_stride, 24);
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 20]);
        let locations: Vec<_> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_uniform_layout() {
        // 48-byte header + 64 × vec4<i32>
        assert_eq!(DustUniforms::SIZE, 48 + 16 * MAX_REGIONS);
        assert_eq!(std::mem::offset_of!(DustUniforms, regions), 48);
        assert_eq!(DustUniforms::SIZE % 16, 0);
    }

    #[test]
    fn test_uniforms_from_regions() {
        let regions = [Region::new(1, 2, 30, 40), Region::new(5, 6, 7, 8)];
        let uniforms = DustUniforms::new(320, 0, &regions, 3, 0.5);
        assert_eq!(uniforms.size, [320.0, 1.0]);
        assert_eq!(uniforms.region_count, 2);
        assert_eq!(uniforms.regions[1], [5, 6, 7, 8]);
        assert_eq!(uniforms.diameter, 3);
        assert_eq!(uniforms.init, 1);
    }

    #[test]
    fn test_region_overflow_is_truncated() {
        let regions = vec![Region::new(0, 0, 1, 1); MAX_REGIONS + 5];
        let mut uniforms = DustUniforms::zeroed();
        uniforms.set_layout(&regions, 1);
        assert_eq!(uniforms.region_count as usize, MAX_REGIONS);
    }

    #[test]
    fn test_buffer_size_never_zero() {
        assert_eq!(ParticleRecord::buffer_size(0), 24);
        assert_eq!(ParticleRecord::buffer_size(250_000), 6_000_000);
    }
}
