//! # DUST Core
//!
//! Everything about the dissolve effect that does not touch the GPU:
//! - Region quantization and the particle density planner
//! - Frame pacing against the display refresh rate
//! - Ping-pong slot bookkeeping for the particle buffers
//! - Session state and the simulation clock
//! - Effect configuration
//!
//! ## Example
//!
//! ```rust
//! use dust_core::{DensityPlanner, PerformanceTier, Region};
//!
//! let mut regions = vec![Region::new(0, 0, 1000, 1000)];
//! let mut planner = DensityPlanner::new(PerformanceTier::High);
//! let budget = planner.plan(&mut regions);
//! assert_eq!((budget.diameter, budget.count), (2, 250_000));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pacing;
pub mod planner;
pub mod region;
pub mod session;
pub mod snapshot;
pub mod sync;
pub mod tier;

pub use config::EffectConfig;
pub use error::{ConfigError, SnapshotError};
pub use pacing::{FramePacer, PacedDelta};
pub use planner::{compute_particle_budget, DensityPlanner, ParticleBudget};
pub use region::Region;
pub use session::{BudgetChange, FrameInput, SessionState};
pub use snapshot::Snapshot;
pub use sync::PingPong;
pub use tier::PerformanceTier;
