//! # Effect Error Types

use dust_core::ConfigError;
use thiserror::Error;

/// Why an effect could not start. Nothing was allocated or attached.
#[derive(Error, Debug)]
pub enum StartError {
    /// The host cannot run the effect.
    #[error("dust effect is not supported on this host")]
    Unsupported,

    /// There is nothing to dissolve.
    #[error("no regions to dissolve")]
    NoRegions,

    /// The configuration does not validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
