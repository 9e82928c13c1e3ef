//! The per-frame loop run on the render thread.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ONE ITERATION                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  halted? budget spent? ──────────────────────► exit      │
//! │  Δ = now - last, clamp to [1/r, 4/r], sleep if short     │
//! │  paused? idle in poll steps, re-arm init                 │
//! │  take pending resize → re-plan, maybe reallocate         │
//! │  draw (simulate + render + present + swap)               │
//! │  first frame? notify once                                │
//! │  post redraw (coalesced)                                 │
//! │  drain and log GPU errors                                │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use dust_core::{BudgetChange, DensityPlanner, EffectConfig, FramePacer, Region, SessionState};

use crate::backend::{ReleaseStep, RenderBackend};
use crate::error::{RenderError, RenderResult};
use crate::thread::control::RenderControl;
use crate::thread::mailbox::HostNotifier;
use crate::thread::state::{RenderState, StateCell};

/// Timing knobs of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Wall-clock budget of the whole loop.
    pub session_budget: Duration,
    /// Sleep step while paused.
    pub pause_poll: Duration,
    /// Display refresh rate in Hz.
    pub refresh_rate: f32,
    /// Upper delta bound, in display frames.
    pub max_delta_factor: f64,
    /// Simulation speed relative to wall clock.
    pub time_scale: f32,
    /// Simulation time wraps to zero past this value.
    pub time_wrap: f32,
}

impl RenderSettings {
    /// Settings from configuration and the host's reported refresh rate.
    #[must_use]
    pub fn from_config(config: &EffectConfig, refresh_rate: f32) -> Self {
        Self {
            session_budget: config.session_budget(),
            pause_poll: config.pause_poll(),
            refresh_rate: config.refresh_rate_or_fallback(refresh_rate),
            max_delta_factor: config.max_delta_factor,
            time_scale: config.time_scale,
            time_wrap: config.time_wrap,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        let config = EffectConfig::default();
        Self::from_config(&config, config.fallback_refresh_rate)
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// The session budget ran out.
    BudgetElapsed,
    /// The host asked to stop.
    Halted,
    /// The backend failed beyond recovery.
    Failed(RenderError),
}

/// Shared handles the loop reports through.
#[derive(Debug, Clone)]
pub struct LoopHandles {
    /// Host-set flags.
    pub control: Arc<RenderControl>,
    /// Observable lifecycle state.
    pub state: Arc<StateCell>,
    /// Mailbox to the host.
    pub notifier: HostNotifier,
}

/// Owns the backend and session state for the life of the loop.
pub struct FrameLoop<B> {
    backend: B,
    session: SessionState,
    planner: DensityPlanner,
    regions: Vec<Region>,
    pacer: FramePacer,
    settings: RenderSettings,
    control: Arc<RenderControl>,
    state: Arc<StateCell>,
    notifier: HostNotifier,
}

impl<B: RenderBackend> FrameLoop<B> {
    /// Wires a ready backend to the shared control block.
    ///
    /// `regions` must already be quantized by `planner`.
    #[must_use]
    pub fn new(
        backend: B,
        session: SessionState,
        planner: DensityPlanner,
        regions: Vec<Region>,
        settings: RenderSettings,
        handles: LoopHandles,
    ) -> Self {
        let LoopHandles {
            control,
            state,
            notifier,
        } = handles;
        Self {
            backend,
            session: session.with_clock(settings.time_scale, settings.time_wrap),
            planner,
            regions,
            pacer: FramePacer::new(settings.refresh_rate, settings.max_delta_factor),
            settings,
            control,
            state,
            notifier,
        }
    }

    /// Session state as of the last iteration.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// The backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Gives the backend back for teardown.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Runs until halted, out of budget, or a fatal backend error.
    pub fn run(&mut self) -> LoopExit {
        let started = Instant::now();
        let mut last = started;

        loop {
            if !self.control.is_running() {
                return LoopExit::Halted;
            }
            if started.elapsed() > self.settings.session_budget {
                return LoopExit::BudgetElapsed;
            }

            let now = Instant::now();
            let paced = self.pacer.pace_duration(now.saturating_duration_since(last));
            last = now;
            if let Some(sleep) = paced.sleep {
                std::thread::sleep(sleep);
            }

            if self.control.is_paused() {
                self.idle();
                // The pause itself is not simulated time.
                last = Instant::now();
                continue;
            }

            if let Err(error) = self.apply_resize() {
                if error.is_fatal() {
                    return LoopExit::Failed(error);
                }
                tracing::debug!(%error, "resize deferred");
            }

            let frame = self.session.advance(paced.delta);
            match self.backend.draw(&frame) {
                Ok(()) => {
                    if self.session.frame_drawn() {
                        tracing::info!(particles = frame.particle_count, "first dust frame drawn");
                        self.notifier.first_frame();
                    }
                    self.notifier.request_redraw();
                }
                Err(error) if !error.is_fatal() => {
                    tracing::debug!(%error, "frame skipped");
                }
                Err(error) => return LoopExit::Failed(error),
            }

            for message in self.backend.poll_errors() {
                tracing::warn!(%message, "GPU error during frame");
            }
        }
    }

    /// Sleeps in poll steps until resumed or halted. Particles are re-seeded
    /// on the next drawn frame.
    fn idle(&mut self) {
        self.state.transition(RenderState::Paused);
        while self.control.is_paused() && self.control.is_running() {
            std::thread::sleep(self.settings.pause_poll);
            self.session.request_init();
        }
        if self.control.is_running() {
            self.state.transition(RenderState::Running);
        }
    }

    /// Applies a pending resize: surface, budget, layout, buffers.
    fn apply_resize(&mut self) -> RenderResult<()> {
        let Some((width, height)) = self.control.take_resize() else {
            return Ok(());
        };

        self.session.resize(width, height);
        if let Err(error) = self.backend.resize(width, height) {
            if !error.is_fatal() {
                self.control.request_resize(width, height);
            }
            return Err(error);
        }

        let budget = self.planner.plan(&mut self.regions);
        self.backend.update_layout(&self.regions, budget.diameter)?;
        let change = self.session.apply_budget(budget);
        if let BudgetChange::Reallocate { capacity } = change {
            self.backend.reallocate(capacity)?;
        }

        tracing::debug!(
            width,
            height,
            particles = budget.count,
            diameter = budget.diameter,
            ?change,
            "resize applied"
        );
        Ok(())
    }
}

impl<B> std::fmt::Debug for FrameLoop<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("session", &self.session)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Runs every release step in order. A failing step is logged and the next
/// one still runs. Returns how many steps failed.
pub fn release_all<B: RenderBackend>(backend: &mut B) -> usize {
    let mut failures = 0;
    for step in ReleaseStep::ALL {
        if let Err(error) = backend.release(step) {
            failures += 1;
            tracing::warn!(step = step.name(), %error, "release step failed");
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::mailbox::host_channel;
    use dust_core::{FrameInput, ParticleBudget, PerformanceTier};

    #[derive(Default)]
    struct Recorder {
        frames: Vec<FrameInput>,
        reallocations: Vec<u32>,
        layouts: Vec<u32>,
        released: Vec<ReleaseStep>,
        fail_step: Option<ReleaseStep>,
    }

    impl RenderBackend for Recorder {
        fn resize(&mut self, _width: u32, _height: u32) -> RenderResult<()> {
            Ok(())
        }

        fn update_layout(&mut self, _regions: &[Region], diameter: u32) -> RenderResult<()> {
            self.layouts.push(diameter);
            Ok(())
        }

        fn reallocate(&mut self, capacity: u32) -> RenderResult<()> {
            self.reallocations.push(capacity);
            Ok(())
        }

        fn draw(&mut self, frame: &FrameInput) -> RenderResult<()> {
            self.frames.push(*frame);
            Ok(())
        }

        fn poll_errors(&mut self) -> Vec<String> {
            Vec::new()
        }

        fn release(&mut self, step: ReleaseStep) -> RenderResult<()> {
            self.released.push(step);
            if self.fail_step == Some(step) {
                Err(RenderError::Backend("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    fn fast_settings(budget_ms: u64) -> RenderSettings {
        RenderSettings {
            session_budget: Duration::from_millis(budget_ms),
            pause_poll: Duration::from_millis(5),
            refresh_rate: 500.0,
            ..RenderSettings::default()
        }
    }

    fn frame_loop(
        regions: Vec<Region>,
        session_budget: ParticleBudget,
        settings: RenderSettings,
    ) -> (FrameLoop<Recorder>, Arc<RenderControl>, crate::thread::mailbox::HostInbox) {
        let mut regions = regions;
        let mut planner = DensityPlanner::new(PerformanceTier::Low);
        planner.plan(&mut regions);
        let control = Arc::new(RenderControl::new());
        let (notifier, inbox) = host_channel(None);
        let frame_loop = FrameLoop::new(
            Recorder::default(),
            SessionState::new(100, 100, session_budget),
            planner,
            regions,
            settings,
            LoopHandles {
                control: Arc::clone(&control),
                state: Arc::new(StateCell::new()),
                notifier,
            },
        );
        (frame_loop, control, inbox)
    }

    #[test]
    fn test_budget_ends_loop() {
        let budget = ParticleBudget { diameter: 1, count: 100 };
        let (mut frame_loop, _control, inbox) =
            frame_loop(vec![Region::new(0, 0, 10, 10)], budget, fast_settings(30));
        assert_eq!(frame_loop.run(), LoopExit::BudgetElapsed);

        let frames = &frame_loop.backend().frames;
        assert!(!frames.is_empty());
        assert!(frames[0].init);
        assert!(frames.iter().skip(1).all(|f| !f.init));
        assert!(inbox.drain().first_frame);
    }

    #[test]
    fn test_halt_before_first_iteration() {
        let budget = ParticleBudget { diameter: 1, count: 100 };
        let (mut frame_loop, control, inbox) =
            frame_loop(vec![Region::new(0, 0, 10, 10)], budget, fast_settings(1_000));
        control.halt();
        assert_eq!(frame_loop.run(), LoopExit::Halted);
        assert!(frame_loop.backend().frames.is_empty());
        assert!(!inbox.drain().first_frame);
    }

    #[test]
    fn test_resize_growing_count_reallocates() {
        // Session starts below what the regions allow.
        let budget = ParticleBudget { diameter: 1, count: 10 };
        let (mut frame_loop, control, _inbox) =
            frame_loop(vec![Region::new(0, 0, 10, 10)], budget, fast_settings(1_000));
        control.request_resize(200, 200);
        frame_loop.apply_resize().unwrap();

        assert_eq!(frame_loop.backend().reallocations, vec![100]);
        assert_eq!(frame_loop.backend().layouts, vec![1]);
        assert!(frame_loop.session().needs_init());
        assert_eq!(frame_loop.session().particle_count(), 100);
        assert_eq!(frame_loop.session().width(), 200);
    }

    #[test]
    fn test_resize_same_count_keeps_buffers() {
        let budget = ParticleBudget { diameter: 1, count: 100 };
        let (mut frame_loop, control, _inbox) =
            frame_loop(vec![Region::new(0, 0, 10, 10)], budget, fast_settings(1_000));
        frame_loop.session.frame_drawn();
        control.request_resize(50, 50);
        frame_loop.apply_resize().unwrap();

        assert!(frame_loop.backend().reallocations.is_empty());
        assert!(!frame_loop.session().needs_init());
    }

    #[test]
    fn test_resize_lower_count_keeps_buffers() {
        // Session starts above what the regions allow.
        let budget = ParticleBudget { diameter: 1, count: 400 };
        let (mut frame_loop, control, _inbox) =
            frame_loop(vec![Region::new(0, 0, 10, 10)], budget, fast_settings(1_000));
        frame_loop.session.frame_drawn();
        control.request_resize(80, 60);
        frame_loop.apply_resize().unwrap();

        assert!(frame_loop.backend().reallocations.is_empty());
        assert_eq!(frame_loop.session().particle_count(), 100);
        assert!(!frame_loop.session().needs_init());
    }

    #[test]
    fn test_pause_does_not_count_as_frame_time() {
        let budget = ParticleBudget { diameter: 1, count: 100 };
        let (mut frame_loop, control, _inbox) =
            frame_loop(vec![Region::new(0, 0, 10, 10)], budget, fast_settings(1_000));
        let max_delta = 4.0_f32 / 500.0 * 0.65;

        control.set_paused(true);
        let resumer = {
            let control = Arc::clone(&control);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(60));
                control.set_paused(false);
                std::thread::sleep(Duration::from_millis(30));
                control.halt();
            })
        };
        assert_eq!(frame_loop.run(), LoopExit::Halted);
        resumer.join().unwrap();

        let frames = &frame_loop.backend().frames;
        assert!(!frames.is_empty());
        assert!(frames[0].init);
        assert!(frames[0].delta_time < max_delta * 0.9);
    }

    #[test]
    fn test_release_all_continues_after_failure() {
        let mut backend = Recorder {
            fail_step: Some(ReleaseStep::Program),
            ..Recorder::default()
        };
        assert_eq!(release_all(&mut backend), 1);
        assert_eq!(backend.released, ReleaseStep::ALL.to_vec());
    }
}
