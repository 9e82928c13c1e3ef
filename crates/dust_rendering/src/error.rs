//! # Rendering Error Types

use thiserror::Error;

/// Errors raised by the GPU backend and the render thread.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The platform surface could not be wrapped.
    #[error("failed to create surface: {0}")]
    SurfaceCreation(String),

    /// No adapter can present to the surface.
    #[error("no compatible GPU adapter")]
    NoAdapter,

    /// The adapter refused to open a device.
    #[error("failed to open GPU device: {0}")]
    DeviceRequest(String),

    /// The surface exposes no usable format.
    #[error("surface does not support any usable format")]
    SurfaceUnsupported,

    /// The GPU program failed to build.
    #[error("GPU program failed to build: {0}")]
    Program(String),

    /// The surface was lost or went out of date. Recoverable by reconfiguring.
    #[error("surface lost")]
    SurfaceLost,

    /// Acquiring the next surface texture timed out.
    #[error("surface acquire timed out")]
    Timeout,

    /// The GPU ran out of memory.
    #[error("GPU out of memory")]
    OutOfMemory,

    /// A validation error surfaced during a GPU call.
    #[error("GPU validation error: {0}")]
    Validation(String),

    /// The resource was already released.
    #[error("{0} already released")]
    Released(&'static str),

    /// The snapshot exceeds the device texture limit.
    #[error("snapshot {width}x{height} exceeds texture limit {limit}")]
    TextureTooLarge {
        /// Snapshot width.
        width: u32,
        /// Snapshot height.
        height: u32,
        /// Device maximum 2D texture dimension.
        limit: u32,
    },

    /// The render thread could not be spawned.
    #[error("failed to spawn render thread: {0}")]
    ThreadSpawn(String),

    /// Any other backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl RenderError {
    /// Whether the frame loop must stop on this error.
    ///
    /// Lost surfaces and timeouts skip a frame; everything else halts.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::SurfaceLost | Self::Timeout)
    }
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(!RenderError::SurfaceLost.is_fatal());
        assert!(!RenderError::Timeout.is_fatal());
        assert!(RenderError::OutOfMemory.is_fatal());
        assert!(RenderError::Backend("x".into()).is_fatal());
    }
}
