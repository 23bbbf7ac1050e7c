//! Engine configuration.
//!
//! Nests the world and flight settings with the demo loop settings.
//! Configuration can be loaded from and saved to a TOML file.

use flyby_common::{FlybyError, FlybyResult};
use flyby_gameplay::FlightConfig;
use flyby_world::WorldConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "flyby.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Loop Settings ===
    /// Simulated frames per second
    pub target_fps: u32,
    /// Length of the demo flight in seconds
    pub demo_seconds: f32,
    /// Seconds between progress log lines (0 = disabled)
    pub log_every_secs: f32,
    /// Pace ticks against the wall clock instead of running flat out
    pub realtime: bool,
    /// Seed for cloud and particle placement (None = random)
    pub cluster_seed: Option<u64>,

    // === Intro ===
    /// Altitude the intro descent ends at
    pub intro_target_altitude: f32,
    /// Intro descent length in seconds
    pub intro_seconds: f32,

    // === Simulation ===
    /// World streaming and terrain
    pub world: WorldConfig,
    /// Vehicle flight
    pub flight: FlightConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            demo_seconds: 60.0,
            log_every_secs: 5.0,
            realtime: false,
            cluster_seed: None,

            intro_target_altitude: 15.0,
            intro_seconds: 3.0,

            world: WorldConfig::default(),
            flight: FlightConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// reported with its path and also yields the defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Ignoring config {}: {e}", path.display());
                Self::default()
            },
        }
    }

    /// Parse a config file, failing on I/O or TOML errors.
    pub fn read(path: &Path) -> FlybyResult<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| FlybyError::Serialization(e.to_string()))
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> FlybyResult<()> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> FlybyResult<()> {
        let path = path.as_ref();
        let contents =
            toml::to_string_pretty(self).map_err(|e| FlybyError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default configuration file path: `FLYBY_CONFIG` if set, else
    /// `flyby.toml` in the working directory.
    fn config_path() -> PathBuf {
        std::env::var_os("FLYBY_CONFIG").map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    /// Clamp loop settings to sensible ranges.
    ///
    /// World and flight settings are not clamped; the session rejects them
    /// if they are invalid.
    pub fn validate(&mut self) {
        self.target_fps = self.target_fps.clamp(10, 240);
        self.demo_seconds = self.demo_seconds.clamp(0.0, 3600.0);
        self.log_every_secs = self.log_every_secs.max(0.0);
        self.intro_seconds = self.intro_seconds.clamp(0.1, 30.0);
    }
}
