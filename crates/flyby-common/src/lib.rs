//! # Flyby Common
//!
//! Common types shared by the Flyby crates:
//! - Chunk coordinates
//! - Error taxonomy (construction failures, configuration errors)
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_checks() {
        assert!(ConfigError::require_positive("segment_size", 100.0).is_ok());
        assert_eq!(
            ConfigError::require_positive("segment_size", 0.0),
            Err(ConfigError::NonPositive {
                field: "segment_size",
                value: 0.0
            })
        );
        assert!(ConfigError::require_positive("segment_size", f64::NAN).is_err());
        assert!(ConfigError::require_non_negative("update_threshold", 0.0).is_ok());
        assert!(ConfigError::require_non_negative("update_threshold", -1.0).is_err());
        assert!(ConfigError::require_at_most("segment_range", 64.0, 64.0).is_ok());
        assert_eq!(
            ConfigError::require_at_most("segment_range", 65.0, 64.0),
            Err(ConfigError::TooLarge {
                field: "segment_range",
                value: 65.0,
                max: 64.0
            })
        );
    }

    #[test]
    fn test_error_wrapping() {
        let err: FlybyError = WorldError::ConstructionFailed {
            x: -1,
            z: 2,
            reason: "out of memory".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "World error: Failed to construct segment at (-1, 2): out of memory"
        );
    }
}
