//! Error types for Flyby.

use thiserror::Error;

/// Top-level error type for Flyby operations.
#[derive(Debug, Error)]
pub enum FlybyError {
    /// World/segment errors
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building world segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// A chunk or cluster could not be synthesized (e.g. allocation failure).
    ///
    /// Not fatal: the coordinate is skipped and retried on a later pass.
    #[error("Failed to construct segment at ({x}, {z}): {reason}")]
    ConstructionFailed {
        /// X coordinate
        x: i32,
        /// Z coordinate
        z: i32,
        /// What went wrong
        reason: String,
    },
}

/// Invalid configuration. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was not
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Offending field
        field: &'static str,
        /// Value found
        value: f64,
    },

    /// A value that must not be negative was
    #[error("`{field}` must not be negative, got {value}")]
    Negative {
        /// Offending field
        field: &'static str,
        /// Value found
        value: f64,
    },

    /// A value exceeds its supported maximum
    #[error("`{field}` must be at most {max}, got {value}")]
    TooLarge {
        /// Offending field
        field: &'static str,
        /// Value found
        value: f64,
        /// Largest accepted value
        max: f64,
    },
}

impl ConfigError {
    /// Checks that `value` is finite and strictly positive.
    pub fn require_positive(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::NonPositive { field, value })
        }
    }

    /// Checks that `value` does not exceed `max`.
    pub fn require_at_most(field: &'static str, value: f64, max: f64) -> Result<(), Self> {
        if value <= max {
            Ok(())
        } else {
            Err(Self::TooLarge { field, value, max })
        }
    }

    /// Checks that `value` is finite and not negative.
    pub fn require_non_negative(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::Negative { field, value })
        }
    }
}

/// Result type alias for Flyby operations.
pub type FlybyResult<T> = Result<T, FlybyError>;

/// Result type for segment construction.
pub type WorldResult<T> = Result<T, WorldError>;
