//! What the effect needs from the host view hierarchy.
//!
//! The host owns the UI thread, the view tree and the platform surfaces.
//! The effect only asks it to attach one transient overlay, to invalidate
//! it, to remove it, and to run one delayed task.

use std::sync::Arc;
use std::time::Duration;

use dust_core::PerformanceTier;
use dust_rendering::HostWaker;

/// Identifies an overlay attached by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// Work the host runs later on its own thread.
pub type DelayedTask = Box<dyn FnOnce() + Send>;

/// Receives lifecycle events of the overlay surface.
///
/// `S` is the platform surface handed to the render backend.
pub trait SurfaceListener<S>: Send + Sync {
    /// The overlay has a surface of the given size.
    fn surface_available(&self, surface: S, width: u32, height: u32);

    /// The overlay surface changed size.
    fn surface_resized(&self, width: u32, height: u32);

    /// The overlay surface is gone.
    fn surface_destroyed(&self);
}

/// The host view the effect runs over.
pub trait HostView<S>: Send + Sync {
    /// Whether the platform can run the effect at all.
    fn supports_effect(&self) -> bool;

    /// Display refresh rate in Hz. Non-positive values fall back to 60.
    fn refresh_rate(&self) -> f32;

    /// Coarse device class; unknown devices report [`PerformanceTier::Low`].
    fn performance_tier(&self) -> PerformanceTier;

    /// Current size of the host view in pixels.
    fn size(&self) -> (u32, u32);

    /// Creates and inserts a full-size transparent overlay that reports its
    /// surface to `listener`.
    fn attach_overlay(&self, listener: Arc<dyn SurfaceListener<S>>) -> OverlayId;

    /// Removes the overlay. Called at most once per overlay.
    fn detach_overlay(&self, overlay: OverlayId);

    /// Schedules a redraw of the overlay.
    fn invalidate_overlay(&self, overlay: OverlayId);

    /// Runs `task` on the host thread after `delay`.
    fn post_delayed(&self, delay: Duration, task: DelayedTask);

    /// Optional hook poked whenever the render thread posts a message.
    fn waker(&self) -> Option<Arc<dyn HostWaker>> {
        None
    }
}
