//! Device performance tiers.

use serde::Deserialize;

/// Coarse device classification bounding the particle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    /// Flagship devices.
    High,
    /// Mid-range devices.
    Average,
    /// Everything else, and the fallback when classification is unknown.
    #[default]
    Low,
}

impl PerformanceTier {
    /// Maximum particle count for this tier.
    #[inline]
    #[must_use]
    pub const fn particle_cap(self) -> u32 {
        match self {
            Self::High => 250_000,
            Self::Average => 180_000,
            Self::Low => 100_000,
        }
    }
}
