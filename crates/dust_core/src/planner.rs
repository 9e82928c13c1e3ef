//! Particle Density Planner
//!
//! Turns region geometry and a performance cap into a cell diameter and a
//! particle count:
//!
//! ```text
//! A  = Σ width × height                    (raw regions)
//! d  = max(previous d, ⌈√A / √C⌉)          (never shrinks)
//! quantize every region to multiples of d
//! A' = Σ width × height                    (quantized regions)
//! n  = min(C, ⌊A' / d²⌋)
//! ```
//!
//! Square roots are integer roots, truncated before the ceiling division.

use crate::region::{total_area, Region};
use crate::tier::PerformanceTier;

/// Result of one planning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleBudget {
    /// Cell edge length in pixels. One particle per cell.
    pub diameter: u32,
    /// Number of particles to simulate.
    pub count: u32,
}

/// Stateful planner that keeps the diameter monotonic across a session.
#[derive(Debug, Clone)]
pub struct DensityPlanner {
    tier: PerformanceTier,
    diameter: u32,
}

impl DensityPlanner {
    /// Creates a planner for the given tier. The diameter starts at 1.
    #[must_use]
    pub const fn new(tier: PerformanceTier) -> Self {
        Self { tier, diameter: 1 }
    }

    /// Tier this planner caps against.
    #[must_use]
    pub const fn tier(&self) -> PerformanceTier {
        self.tier
    }

    /// Largest diameter computed so far.
    #[must_use]
    pub const fn diameter(&self) -> u32 {
        self.diameter
    }

    /// Plans a budget for `regions`, quantizing them in place.
    ///
    /// Every call uses the previous diameter as a floor, so the diameter only
    /// ever grows across a session.
    pub fn plan(&mut self, regions: &mut [Region]) -> ParticleBudget {
        let budget = compute_particle_budget(regions, self.tier, self.diameter);
        self.diameter = budget.diameter;
        tracing::debug!(
            diameter = budget.diameter,
            count = budget.count,
            regions = regions.len(),
            "planned particle budget"
        );
        budget
    }
}

/// One planning pass with an explicit diameter floor.
///
/// Quantizes `regions` in place and returns the resulting budget.
pub fn compute_particle_budget(
    regions: &mut [Region],
    tier: PerformanceTier,
    previous_diameter: u32,
) -> ParticleBudget {
    let cap = u64::from(tier.particle_cap());
    let raw_area = total_area(regions);

    let wanted = integer_sqrt(raw_area).div_ceil(integer_sqrt(cap));
    let wanted = u32::try_from(wanted).unwrap_or(u32::MAX);
    let diameter = previous_diameter.max(wanted).max(1);

    for region in regions.iter_mut() {
        region.quantize(diameter);
    }

    let quantized_area = total_area(regions);
    let cell_area = u64::from(diameter) * u64::from(diameter);
    let count = (quantized_area / cell_area).min(cap);

    ParticleBudget {
        diameter,
        // count <= cap <= u32::MAX
        count: count as u32,
    }
}

/// Integer square root, rounded down.
#[must_use]
pub fn integer_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Float estimate, then correct the last few ulps.
    let mut root = (n as f64).sqrt() as u64;
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= n) {
        root += 1;
    }
    root
}
