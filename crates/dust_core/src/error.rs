//! # Core Error Types

use thiserror::Error;

/// Errors raised while building a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// One of the dimensions is zero.
    #[error("snapshot has no pixels: {width}x{height}")]
    Empty {
        /// Width given.
        width: u32,
        /// Height given.
        height: u32,
    },

    /// Pixel buffer length does not match the dimensions.
    #[error("snapshot pixel buffer is {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Expected byte count.
        expected: u64,
        /// Actual byte count.
        actual: usize,
    },
}

/// Errors raised while loading effect configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML could not be parsed.
    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
