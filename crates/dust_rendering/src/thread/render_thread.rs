//! Spawning and steering the render thread.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use dust_core::{DensityPlanner, ParticleBudget, PerformanceTier, Region, SessionState, Snapshot};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::backend::{BackendFactory, BackendInit};
use crate::error::{RenderError, RenderResult};
use crate::thread::control::RenderControl;
use crate::thread::frame_loop::{release_all, FrameLoop, LoopExit, LoopHandles, RenderSettings};
use crate::thread::mailbox::HostNotifier;
use crate::thread::state::{RenderState, StateCell};

/// Name given to every render thread.
pub const RENDER_THREAD_NAME: &str = "dust-render";

/// A planned effect session, ready to hand to a render thread.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Image the particles sample from.
    pub snapshot: Arc<Snapshot>,
    /// Regions, quantized by `planner`.
    pub regions: Vec<Region>,
    /// Planner that produced `budget`; keeps the diameter floor for resizes.
    pub planner: DensityPlanner,
    /// Initial budget.
    pub budget: ParticleBudget,
    /// Session seed in [0, 1).
    pub seed: f32,
}

impl RenderJob {
    /// Plans the initial budget for `regions` and draws a session seed.
    #[must_use]
    pub fn plan(
        width: u32,
        height: u32,
        snapshot: Arc<Snapshot>,
        mut regions: Vec<Region>,
        tier: PerformanceTier,
    ) -> Self {
        let mut planner = DensityPlanner::new(tier);
        let budget = planner.plan(&mut regions);
        Self {
            width,
            height,
            snapshot,
            regions,
            planner,
            budget,
            seed: session_seed(),
        }
    }

    /// Replaces the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: f32) -> Self {
        self.seed = seed;
        self
    }

    fn backend_init(&self) -> BackendInit {
        BackendInit {
            width: self.width,
            height: self.height,
            snapshot: Arc::clone(&self.snapshot),
            regions: self.regions.clone(),
            budget: self.budget,
            seed: self.seed,
        }
    }
}

/// A fresh seed in [0, 1), in 1/256 steps.
#[must_use]
pub fn session_seed() -> f32 {
    let mut rng = StdRng::from_entropy();
    f32::from(rng.gen_range(0..=u8::MAX)) / 256.0
}

/// Entry point for spawning render threads.
#[derive(Debug)]
pub struct RenderThread;

impl RenderThread {
    /// Spawns a render thread that builds its backend with `factory` on
    /// `surface`, then runs the frame loop until halted or out of budget.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ThreadSpawn`] if the OS refuses the thread.
    /// Everything after that is reported through the state and the log.
    pub fn spawn<F: BackendFactory>(
        factory: F,
        surface: F::Surface,
        job: RenderJob,
        settings: RenderSettings,
        notifier: HostNotifier,
    ) -> RenderResult<RenderThreadHandle> {
        let control = Arc::new(RenderControl::new());
        let state = Arc::new(StateCell::new());
        let handles = LoopHandles {
            control: Arc::clone(&control),
            state: Arc::clone(&state),
            notifier,
        };

        let join = std::thread::Builder::new()
            .name(RENDER_THREAD_NAME.into())
            .spawn(move || Self::thread_main(factory, surface, job, settings, handles))
            .map_err(|e| RenderError::ThreadSpawn(e.to_string()))?;

        Ok(RenderThreadHandle {
            control,
            state,
            join: Some(join),
        })
    }

    fn thread_main<F: BackendFactory>(
        mut factory: F,
        surface: F::Surface,
        job: RenderJob,
        settings: RenderSettings,
        handles: LoopHandles,
    ) {
        let state = Arc::clone(&handles.state);
        state.transition(RenderState::Initializing);

        if !handles.control.is_running() {
            tracing::debug!("render thread halted before initialization");
            Self::finish(&state);
            return;
        }

        let mut backend = match factory.create(surface, &job.backend_init()) {
            Ok(backend) => backend,
            Err(error) => {
                tracing::error!(%error, "dust effect failed to initialize");
                Self::finish(&state);
                return;
            }
        };

        if state.transition(RenderState::Running) {
            let session = SessionState::new(job.width, job.height, job.budget);
            let mut frame_loop =
                FrameLoop::new(backend, session, job.planner, job.regions, settings, handles);
            match frame_loop.run() {
                LoopExit::Failed(error) => tracing::error!(%error, "dust render loop failed"),
                exit => tracing::info!(
                    ?exit,
                    frames = frame_loop.session().frames_drawn(),
                    "dust render loop finished"
                ),
            }
            backend = frame_loop.into_backend();
        }

        state.transition(RenderState::Halting);
        let failures = release_all(&mut backend);
        drop(backend);
        if failures > 0 {
            tracing::warn!(failures, "dust teardown finished with failures");
        }
        state.transition(RenderState::Terminated);
    }

    fn finish(state: &StateCell) {
        state.transition(RenderState::Halting);
        state.transition(RenderState::Terminated);
    }
}

/// Host-side handle to a running render thread.
///
/// Dropping the handle neither halts nor joins the thread.
#[derive(Debug)]
pub struct RenderThreadHandle {
    control: Arc<RenderControl>,
    state: Arc<StateCell>,
    join: Option<JoinHandle<()>>,
}

impl RenderThreadHandle {
    /// Asks the thread to stop after the current frame. Never blocks.
    pub fn halt(&self) {
        self.control.halt();
    }

    /// Pauses or resumes drawing.
    pub fn set_paused(&self, paused: bool) {
        self.control.set_paused(paused);
    }

    /// Queues a resize for the next frame.
    pub fn request_resize(&self, width: u32, height: u32) {
        self.control.request_resize(width, height);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RenderState {
        self.state.get()
    }

    /// Shared state cell, for waiting without holding the handle.
    #[must_use]
    pub fn state_cell(&self) -> Arc<StateCell> {
        Arc::clone(&self.state)
    }

    /// Blocks until the thread terminated or `timeout` elapsed.
    /// Returns whether it terminated.
    #[must_use]
    pub fn wait_terminated(&self, timeout: Duration) -> bool {
        self.state.wait_until(timeout, RenderState::is_terminal)
    }

    /// Waits for the thread to exit.
    ///
    /// # Errors
    ///
    /// Reports a panic on the render thread.
    pub fn join(mut self) -> RenderResult<()> {
        match self.join.take() {
            Some(join) => join
                .join()
                .map_err(|_| RenderError::Backend("render thread panicked".into())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_quantized() {
        for _ in 0..32 {
            let seed = session_seed();
            assert!((0.0..1.0).contains(&seed));
            assert!((seed * 256.0).fract().abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_job_plans_budget() {
        let snapshot = Arc::new(Snapshot::solid(1000, 1000, [0, 0, 0, 255]));
        let job = RenderJob::plan(
            1000,
            1000,
            snapshot,
            vec![Region::new(0, 0, 1000, 1000)],
            PerformanceTier::High,
        )
        .with_seed(0.5);
        assert_eq!(job.budget, ParticleBudget { diameter: 2, count: 250_000 });
        assert_eq!(job.planner.diameter(), 2);
        assert!((job.seed - 0.5).abs() < f32::EPSILON);
    }
}
