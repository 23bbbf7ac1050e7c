//! World configuration.
//!
//! Fixed at process start. `validate` must pass before any segment is built;
//! the session refuses to start otherwise.

use flyby_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest accepted `segment_range`; keeps the ensured square (and the
/// chunk arithmetic around it) bounded.
pub const MAX_SEGMENT_RANGE: u32 = 64;

/// World streaming and generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    // === Chunking ===
    /// Side length of a chunk in world units
    pub segment_size: f32,
    /// Grid cells per chunk side (vertices per side is one more)
    pub subdivisions: u32,
    /// Chebyshev radius, in chunks, of the square ensured around the vehicle
    pub segment_range: u32,

    // === Streaming ===
    /// Vehicle displacement that triggers a streaming pass
    pub update_threshold: f32,
    /// Terrain chunks farther than this from the vehicle are evicted
    pub terrain_evict_radius: f32,
    /// Cloud clusters farther than this are evicted
    pub cloud_evict_radius: f32,
    /// Particle clusters farther than this are evicted
    pub particle_evict_radius: f32,

    // === Terrain ===
    /// Noise seed
    pub seed: u32,
    /// Spatial frequency applied to world coordinates before sampling
    pub noise_scale: f64,
    /// Elevation amplitude
    pub height_scale: f32,
    /// Hue at the world origin (0-1)
    pub base_hue: f32,
    /// Hue change per world unit along X and Z
    pub hue_drift: f32,
    /// Horizontal tolerance for the nearest-vertex height lookup
    pub height_tolerance: f32,

    // === Ambient motion ===
    /// Cloud drift speed along X (units per second)
    pub cloud_drift_speed: f32,
    /// Seconds between cloud drift reversals
    pub cloud_switch_interval: f32,
    /// Idle particle drift along X and Z (units per second)
    pub particle_drift_speed: f32,
    /// Particle speed against the vehicle's heading while it is driving
    pub particle_rush_speed: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            // Chunking
            segment_size: 100.0,
            subdivisions: 32,
            segment_range: 2,

            // Streaming
            update_threshold: 50.0,
            terrain_evict_radius: 300.0,
            cloud_evict_radius: 1300.0,
            particle_evict_radius: 300.0,

            // Terrain
            seed: 0,
            noise_scale: 0.03,
            height_scale: 10.0,
            base_hue: 0.9,
            hue_drift: 0.0005,
            height_tolerance: 1.0,

            // Ambient motion (per-frame source values at 60 Hz)
            cloud_drift_speed: 3.6,
            cloud_switch_interval: 6.0,
            particle_drift_speed: 1.8,
            particle_rush_speed: 6.0,
        }
    }
}

impl WorldConfig {
    /// Checks that chunk sizing and radii are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("segment_size", f64::from(self.segment_size))?;
        ConfigError::require_positive("subdivisions", f64::from(self.subdivisions))?;
        ConfigError::require_positive("segment_range", f64::from(self.segment_range))?;
        ConfigError::require_at_most(
            "segment_range",
            f64::from(self.segment_range),
            f64::from(MAX_SEGMENT_RANGE),
        )?;
        ConfigError::require_non_negative("update_threshold", f64::from(self.update_threshold))?;
        ConfigError::require_positive(
            "terrain_evict_radius",
            f64::from(self.terrain_evict_radius),
        )?;
        ConfigError::require_positive("cloud_evict_radius", f64::from(self.cloud_evict_radius))?;
        ConfigError::require_positive(
            "particle_evict_radius",
            f64::from(self.particle_evict_radius),
        )?;
        ConfigError::require_positive("noise_scale", self.noise_scale)?;
        ConfigError::require_positive("height_scale", f64::from(self.height_scale))?;
        ConfigError::require_positive("height_tolerance", f64::from(self.height_tolerance))?;
        ConfigError::require_non_negative("cloud_drift_speed", f64::from(self.cloud_drift_speed))?;
        ConfigError::require_positive(
            "cloud_switch_interval",
            f64::from(self.cloud_switch_interval),
        )?;
        ConfigError::require_non_negative(
            "particle_drift_speed",
            f64::from(self.particle_drift_speed),
        )?;
        ConfigError::require_non_negative(
            "particle_rush_speed",
            f64::from(self.particle_rush_speed),
        )?;
        Ok(())
    }
}
