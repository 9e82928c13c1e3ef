//! GPU context bound to one platform surface.
//!
//! Created on the render thread and pinned there: the context is `!Send`,
//! so nothing else can reach the device or the surface.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::{RenderError, RenderResult};

/// Device, queue and configured surface for one session.
pub struct GpuContext {
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    max_texture_dimension: u32,
    errors: Arc<Mutex<Vec<String>>>,
    _thread_bound: PhantomData<*const ()>,
}

impl GpuContext {
    /// Acquires an adapter that can present to `window` and opens a device.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be created, no adapter is compatible, the
    /// device cannot be opened, or the surface exposes no format.
    pub fn new<W>(window: Arc<W>, width: u32, height: u32) -> RenderResult<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter acquired");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("DUST"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            },
            None,
        ))
        .map_err(|e| RenderError::DeviceRequest(e.to_string()))?;

        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        device.on_uncaptured_error(Box::new(move |error| {
            sink.lock().push(error.to_string());
        }));

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::SurfaceUnsupported)?;
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface: Some(surface),
            max_texture_dimension: device.limits().max_texture_dimension_2d,
            device: Some(device),
            queue: Some(queue),
            config,
            errors,
            _thread_bound: PhantomData,
        })
    }

    /// The device.
    ///
    /// # Errors
    ///
    /// Fails after the context was released.
    pub fn device(&self) -> RenderResult<&wgpu::Device> {
        self.device.as_ref().ok_or(RenderError::Released("context"))
    }

    /// The queue.
    ///
    /// # Errors
    ///
    /// Fails after the context was released.
    pub fn queue(&self) -> RenderResult<&wgpu::Queue> {
        self.queue.as_ref().ok_or(RenderError::Released("context"))
    }

    /// Surface texture format.
    #[must_use]
    pub const fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Largest 2D texture the device accepts.
    #[must_use]
    pub const fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    /// Reconfigures the surface to a new size.
    ///
    /// # Errors
    ///
    /// Fails after the surface or context was released.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.reconfigure()
    }

    /// Re-applies the current configuration, e.g. after the surface was lost.
    ///
    /// # Errors
    ///
    /// Fails after the surface or context was released.
    pub fn reconfigure(&self) -> RenderResult<()> {
        let surface = self.surface.as_ref().ok_or(RenderError::Released("surface"))?;
        surface.configure(self.device()?, &self.config);
        Ok(())
    }

    /// Acquires the next surface texture.
    ///
    /// # Errors
    ///
    /// Maps acquisition failures onto [`RenderError`]. A lost or outdated
    /// surface is reconfigured before returning [`RenderError::SurfaceLost`].
    pub fn acquire(&self) -> RenderResult<wgpu::SurfaceTexture> {
        let surface = self.surface.as_ref().ok_or(RenderError::Released("surface"))?;
        match surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure()?;
                Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::Timeout) => Err(RenderError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
            #[allow(unreachable_patterns)]
            Err(other) => Err(RenderError::Backend(other.to_string())),
        }
    }

    /// Takes every uncaptured GPU error reported since the last call.
    pub fn drain_errors(&self) -> Vec<String> {
        std::mem::take(&mut *self.errors.lock())
    }

    /// Drops the surface.
    ///
    /// # Errors
    ///
    /// Fails if the surface was already released.
    pub fn release_surface(&mut self) -> RenderResult<()> {
        self.surface.take().map(drop).ok_or(RenderError::Released("surface"))
    }

    /// Waits for outstanding GPU work, then drops queue and device.
    ///
    /// # Errors
    ///
    /// Fails if the context was already released.
    pub fn release(&mut self) -> RenderResult<()> {
        let device = self.device.take().ok_or(RenderError::Released("context"))?;
        let _ = device.poll(wgpu::Maintain::Wait);
        self.queue = None;
        drop(device);
        Ok(())
    }
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("format", &self.config.format)
            .field("width", &self.config.width)
            .field("height", &self.config.height)
            .field("live", &self.device.is_some())
            .finish_non_exhaustive()
    }
}
