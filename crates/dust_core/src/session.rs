//! Effect session state, owned by the render thread.

use crate::planner::ParticleBudget;

/// Simulation speed relative to wall clock.
pub const DEFAULT_TIME_SCALE: f32 = 0.65;

/// Simulation time wraps to zero past this value.
pub const DEFAULT_TIME_WRAP: f32 = 1000.0;

/// What a new particle budget requires from the GPU side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetChange {
    /// The count grew: reallocate both buffers to `capacity` records and
    /// re-seed every particle.
    Reallocate {
        /// New buffer capacity in particles.
        capacity: u32,
    },
    /// The count stayed or shrank: keep the buffers, draw fewer particles.
    Keep,
}

/// Per-frame values handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Accumulated simulation time.
    pub time: f32,
    /// Scaled delta for this frame.
    pub delta_time: f32,
    /// Seed every particle from its cell this frame.
    pub init: bool,
    /// Particles to simulate and draw.
    pub particle_count: u32,
}

/// Mutable state of one effect session.
#[derive(Debug, Clone)]
pub struct SessionState {
    width: u32,
    height: u32,
    particle_count: u32,
    diameter: u32,
    time: f32,
    time_scale: f32,
    time_wrap: f32,
    needs_init: bool,
    first_frame_sent: bool,
    frames_drawn: u64,
}

impl SessionState {
    /// Starts a session at the given target size and initial budget.
    ///
    /// The init flag is armed for the first frame.
    #[must_use]
    pub fn new(width: u32, height: u32, budget: ParticleBudget) -> Self {
        Self {
            width,
            height,
            particle_count: budget.count,
            diameter: budget.diameter,
            time: 0.0,
            time_scale: DEFAULT_TIME_SCALE,
            time_wrap: DEFAULT_TIME_WRAP,
            needs_init: true,
            first_frame_sent: false,
            frames_drawn: 0,
        }
    }

    /// Overrides the simulation clock constants.
    #[must_use]
    pub fn with_clock(mut self, time_scale: f32, time_wrap: f32) -> Self {
        self.time_scale = time_scale;
        self.time_wrap = time_wrap;
        self
    }

    /// Target surface width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Target surface height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Current particle draw count.
    #[must_use]
    pub const fn particle_count(&self) -> u32 {
        self.particle_count
    }

    /// Current cell diameter.
    #[must_use]
    pub const fn diameter(&self) -> u32 {
        self.diameter
    }

    /// Accumulated simulation time.
    #[must_use]
    pub const fn time(&self) -> f32 {
        self.time
    }

    /// Whether the next frame re-seeds particles.
    #[must_use]
    pub const fn needs_init(&self) -> bool {
        self.needs_init
    }

    /// Whether the first-frame notification went out.
    #[must_use]
    pub const fn first_frame_sent(&self) -> bool {
        self.first_frame_sent
    }

    /// Frames successfully drawn.
    #[must_use]
    pub const fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Re-arms the init pass, e.g. after a pause.
    pub fn request_init(&mut self) {
        self.needs_init = true;
    }

    /// Advances the clock by a paced delta and returns this frame's input.
    ///
    /// `t += Δ × scale`, wrapping to zero past the wrap point.
    pub fn advance(&mut self, delta: f64) -> FrameInput {
        let scaled = delta as f32 * self.time_scale;
        self.time += scaled;
        if self.time > self.time_wrap {
            self.time = 0.0;
        }
        FrameInput {
            time: self.time,
            delta_time: scaled,
            init: self.needs_init,
            particle_count: self.particle_count,
        }
    }

    /// Records a successfully drawn frame and disarms the init pass.
    ///
    /// Returns true exactly once: for the first frame ever drawn.
    pub fn frame_drawn(&mut self) -> bool {
        self.needs_init = false;
        self.frames_drawn += 1;
        if self.first_frame_sent {
            false
        } else {
            self.first_frame_sent = true;
            true
        }
    }

    /// Applies a new target size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Applies a re-planned budget and reports what the buffers need.
    ///
    /// Buffers only grow. A larger count reallocates and re-arms init, a
    /// smaller or equal one keeps the existing buffers.
    pub fn apply_budget(&mut self, budget: ParticleBudget) -> BudgetChange {
        let change = if budget.count > self.particle_count {
            self.needs_init = true;
            BudgetChange::Reallocate { capacity: budget.count }
        } else {
            BudgetChange::Keep
        };
        self.particle_count = budget.count;
        self.diameter = self.diameter.max(budget.diameter);
        change
    }
}
