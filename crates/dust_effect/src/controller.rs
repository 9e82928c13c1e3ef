//! Effect Controller
//!
//! ```text
//!  start ──► attach overlay ──► surface_available ──► plan + spawn render thread
//!    │                                │
//!    │                          surface_resized ──► request_resize
//!    │                          surface_destroyed ─► halt
//!    │
//!    └─► watchdog (2200 ms) ──► destroy: halt thread, detach overlay
//! ```
//!
//! The host thread never waits on the render thread. Messages flow back
//! through the mailbox and are handled in [`DustEffect::dispatch`].

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dust_core::{EffectConfig, Region, Snapshot};
use dust_rendering::gpu::MAX_REGIONS;
use dust_rendering::{
    host_channel, BackendFactory, HostInbox, HostNotifier, RenderJob, RenderSettings, RenderState, RenderThread,
    RenderThreadHandle,
};
use parking_lot::Mutex;

use crate::error::StartError;
use crate::host::{HostView, OverlayId, SurfaceListener};

/// Called on the host thread once the first frame is on screen.
pub type FirstFrameCallback = Box<dyn FnOnce() + Send>;

/// What to dissolve.
#[derive(Debug, Clone)]
pub struct EffectRequest {
    /// Rasterized host view.
    pub snapshot: Arc<Snapshot>,
    /// Sub-rectangles of the snapshot to dissolve.
    pub regions: Vec<Region>,
    /// Timing configuration.
    pub config: EffectConfig,
}

impl EffectRequest {
    /// A request with default configuration.
    #[must_use]
    pub fn new(snapshot: Snapshot, regions: Vec<Region>) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            regions,
            config: EffectConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EffectConfig) -> Self {
        self.config = config;
        self
    }
}

/// State shared by the handle, the overlay listener and the watchdog.
struct EffectShared<H, S> {
    host: Arc<H>,
    destroyed: AtomicBool,
    paused: AtomicBool,
    overlay: Mutex<Option<OverlayId>>,
    render: Mutex<Option<RenderThreadHandle>>,
    inbox: HostInbox,
    on_first_frame: Mutex<Option<FirstFrameCallback>>,
    _surface: PhantomData<fn(S)>,
}

impl<H: HostView<S>, S> EffectShared<H, S> {
    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(render) = self.render.lock().as_ref() {
            render.halt();
        }
        let overlay = self.overlay.lock().take();
        if let Some(overlay) = overlay {
            self.host.detach_overlay(overlay);
        }
        tracing::info!("dust effect destroyed");
    }

    fn with_render(&self, f: impl FnOnce(&RenderThreadHandle)) {
        if let Some(render) = self.render.lock().as_ref() {
            f(render);
        }
    }
}

/// Handle to one running dissolve effect. Cheap to clone.
pub struct DustEffect<H, S> {
    shared: Arc<EffectShared<H, S>>,
}

impl<H, S> Clone for DustEffect<H, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<H, S> DustEffect<H, S>
where
    H: HostView<S> + 'static,
    S: Send + 'static,
{
    /// Starts the effect over `host`.
    ///
    /// Attaches an overlay and schedules the watchdog; the render thread is
    /// spawned once the overlay reports a surface. `on_first_frame` runs on
    /// the host thread, from [`dispatch`](Self::dispatch), at most once.
    ///
    /// # Errors
    ///
    /// [`StartError::Unsupported`] if the host cannot run the effect,
    /// [`StartError::NoRegions`] if `request.regions` is empty,
    /// [`StartError::Config`] if the configuration does not validate.
    /// Nothing is attached or scheduled in any of these cases.
    pub fn start<F>(
        host: Arc<H>,
        factory: F,
        request: EffectRequest,
        on_first_frame: impl FnOnce() + Send + 'static,
    ) -> Result<Self, StartError>
    where
        F: BackendFactory<Surface = S>,
    {
        if !host.supports_effect() {
            return Err(StartError::Unsupported);
        }
        if request.regions.is_empty() {
            return Err(StartError::NoRegions);
        }
        request.config.validate()?;

        let EffectRequest {
            snapshot,
            mut regions,
            config,
        } = request;
        if regions.len() > MAX_REGIONS {
            tracing::warn!(
                regions = regions.len(),
                kept = MAX_REGIONS,
                "too many dust regions, extra regions are ignored"
            );
            regions.truncate(MAX_REGIONS);
        }

        let (notifier, inbox) = host_channel(host.waker());
        let shared = Arc::new(EffectShared {
            host: Arc::clone(&host),
            destroyed: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            overlay: Mutex::new(None),
            render: Mutex::new(None),
            inbox,
            on_first_frame: Mutex::new(Some(Box::new(on_first_frame) as FirstFrameCallback)),
            _surface: PhantomData,
        });

        let listener = Arc::new(OverlayListener {
            shared: Arc::downgrade(&shared),
            launch: Mutex::new(Some(Launch {
                factory,
                snapshot,
                regions,
                notifier,
                config: config.clone(),
            })),
        });
        let overlay = host.attach_overlay(listener);
        *shared.overlay.lock() = Some(overlay);

        let watchdog = Arc::clone(&shared);
        host.post_delayed(
            config.watchdog(),
            Box::new(move || {
                tracing::debug!("dust watchdog fired");
                watchdog.destroy();
            }),
        );

        tracing::info!(overlay = overlay.0, "dust effect started");
        Ok(Self { shared })
    }

    /// Tears the effect down: halts the render thread without waiting and
    /// removes the overlay. Idempotent.
    pub fn destroy(&self) {
        self.shared.destroy();
    }

    /// Whether [`destroy`](Self::destroy) ran, directly or via the watchdog.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::Acquire)
    }

    /// Handles render thread messages. Call on the host thread, e.g. when
    /// the host waker fires.
    pub fn dispatch(&self) {
        let messages = self.shared.inbox.drain();
        if messages.redraw && !self.is_destroyed() {
            let overlay = *self.shared.overlay.lock();
            if let Some(overlay) = overlay {
                self.shared.host.invalidate_overlay(overlay);
            }
        }
        if messages.first_frame {
            let callback = self.shared.on_first_frame.lock().take();
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    /// Stops drawing until [`resume`](Self::resume). Particles re-seed on resume.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
        self.shared.with_render(|render| render.set_paused(true));
    }

    /// Continues drawing after [`pause`](Self::pause).
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
        self.shared.with_render(|render| render.set_paused(false));
    }

    /// Render thread state, or `None` before the surface arrived.
    #[must_use]
    pub fn render_state(&self) -> Option<RenderState> {
        self.shared.render.lock().as_ref().map(RenderThreadHandle::state)
    }

    /// Blocks until the render thread terminated. Returns true right away
    /// if no render thread was ever spawned.
    #[must_use]
    pub fn wait_terminated(&self, timeout: Duration) -> bool {
        // Wait without holding the slot so destroy() is never blocked.
        let state = self.shared.render.lock().as_ref().map(RenderThreadHandle::state_cell);
        state.map_or(true, |state| state.wait_until(timeout, RenderState::is_terminal))
    }
}

impl<H, S> std::fmt::Debug for DustEffect<H, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DustEffect")
            .field("destroyed", &self.shared.destroyed.load(Ordering::Relaxed))
            .field("overlay", &*self.shared.overlay.lock())
            .finish_non_exhaustive()
    }
}

/// Everything needed to spawn the render thread, consumed on first surface.
struct Launch<F> {
    factory: F,
    snapshot: Arc<Snapshot>,
    regions: Vec<Region>,
    notifier: HostNotifier,
    config: EffectConfig,
}

/// Overlay surface events → render thread.
struct OverlayListener<H, S, F> {
    shared: Weak<EffectShared<H, S>>,
    launch: Mutex<Option<Launch<F>>>,
}

impl<H, S, F> SurfaceListener<S> for OverlayListener<H, S, F>
where
    H: HostView<S> + 'static,
    S: Send + 'static,
    F: BackendFactory<Surface = S>,
{
    fn surface_available(&self, surface: S, width: u32, height: u32) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if shared.destroyed.load(Ordering::Acquire) {
            tracing::debug!("surface arrived after destroy, ignored");
            return;
        }
        let Some(launch) = self.launch.lock().take() else {
            tracing::debug!("render thread already started, surface ignored");
            return;
        };

        let (width, height) = if width == 0 || height == 0 {
            shared.host.size()
        } else {
            (width, height)
        };
        let job = RenderJob::plan(
            width,
            height,
            launch.snapshot,
            launch.regions,
            shared.host.performance_tier(),
        );
        let settings = RenderSettings::from_config(&launch.config, shared.host.refresh_rate());
        tracing::debug!(
            width,
            height,
            particles = job.budget.count,
            diameter = job.budget.diameter,
            "spawning dust render thread"
        );

        let render = match RenderThread::spawn(launch.factory, surface, job, settings, launch.notifier) {
            Ok(render) => render,
            Err(error) => {
                tracing::error!(%error, "dust render thread failed to start");
                return;
            }
        };
        // Flags are read under the slot lock; pause and destroy either see the
        // handle or have already stored their flag.
        let mut slot = shared.render.lock();
        if shared.paused.load(Ordering::Acquire) {
            render.set_paused(true);
        }
        if shared.destroyed.load(Ordering::Acquire) {
            render.halt();
        }
        *slot = Some(render);
    }

    fn surface_resized(&self, width: u32, height: u32) {
        if let Some(shared) = self.shared.upgrade() {
            shared.with_render(|render| render.request_resize(width, height));
        }
    }

    fn surface_destroyed(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.with_render(RenderThreadHandle::halt);
        }
    }
}
