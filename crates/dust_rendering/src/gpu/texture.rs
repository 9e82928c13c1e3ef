//! Snapshot upload.

use dust_core::Snapshot;

use crate::error::{RenderError, RenderResult};

/// The snapshot as a sampled GPU texture.
pub struct SnapshotTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl SnapshotTexture {
    /// Uploads `snapshot` as an `Rgba8Unorm` texture.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TextureTooLarge`] if either dimension exceeds
    /// `max_dimension`.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        snapshot: &Snapshot,
        max_dimension: u32,
    ) -> RenderResult<Self> {
        let (width, height) = (snapshot.width(), snapshot.height());
        if width > max_dimension || height > max_dimension {
            return Err(RenderError::TextureTooLarge {
                width,
                height,
                limit: max_dimension,
            });
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("dust snapshot"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            snapshot.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(snapshot.bytes_per_row()),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("dust snapshot"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        tracing::debug!(width, height, "snapshot uploaded");
        Ok(Self { texture, view, sampler })
    }

    /// Texture view for binding.
    #[must_use]
    pub const fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Sampler for binding.
    #[must_use]
    pub const fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Frees the texture memory immediately.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

impl std::fmt::Debug for SnapshotTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self.texture.size();
        f.debug_struct("SnapshotTexture")
            .field("width", &size.width)
            .field("height", &size.height)
            .finish_non_exhaustive()
    }
}
