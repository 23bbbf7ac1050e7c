//! Vehicle flight with terrain floor and altitude ceiling.
//!
//! The controller integrates yaw and position from [`InputFlags`], then
//! clamps altitude against the ground (via [`HeightQuery`]) and a fixed
//! ceiling. The ceiling is applied last and wins when the two conflict.

use flyby_common::ConfigError;
use flyby_world::HeightQuery;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::InputFlags;

/// Flight tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Translation speed in units per second
    pub flight_speed: f32,
    /// Yaw speed in radians per second
    pub rotation_speed: f32,
    /// Minimum height above the ground
    pub ground_clearance: f32,
    /// Absolute altitude ceiling
    pub max_flying_height: f32,
    /// Spawn position
    pub spawn: Vec3,
    /// Spawn heading in radians
    pub spawn_yaw: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            flight_speed: 30.0,
            rotation_speed: 3.0,
            ground_clearance: 5.0,
            max_flying_height: 60.0,
            spawn: Vec3::new(0.0, 100.0, 0.0),
            spawn_yaw: 0.0,
        }
    }
}

impl FlightConfig {
    /// Validates the configuration.
    ///
    /// A clearance above the ceiling is accepted: the ceiling is applied
    /// last and wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("flight_speed", f64::from(self.flight_speed))?;
        ConfigError::require_non_negative("rotation_speed", f64::from(self.rotation_speed))?;
        ConfigError::require_non_negative("ground_clearance", f64::from(self.ground_clearance))?;
        ConfigError::require_positive("max_flying_height", f64::from(self.max_flying_height))?;
        Ok(())
    }
}

/// Position and heading of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehiclePose {
    /// World position
    pub position: Vec3,
    /// Heading around +Y in radians
    pub yaw: f32,
}

impl VehiclePose {
    /// Unit heading on the XZ plane. Yaw 0 faces +Z.
    #[must_use]
    pub fn facing(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

/// Whether player input drives the vehicle yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlGate {
    /// Intro descent still running; input is ignored
    #[default]
    AscendPending,
    /// Player has control
    ControlsEnabled,
}

/// Integrates vehicle motion each tick.
#[derive(Debug, Clone)]
pub struct FlightController {
    config: FlightConfig,
    pose: VehiclePose,
    gate: ControlGate,
}

impl FlightController {
    /// Spawns the vehicle with controls gated.
    #[must_use]
    pub fn new(config: FlightConfig) -> Self {
        let pose = VehiclePose {
            position: config.spawn,
            yaw: config.spawn_yaw,
        };
        Self {
            config,
            pose,
            gate: ControlGate::AscendPending,
        }
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> VehiclePose {
        self.pose
    }

    /// Current gate state.
    #[must_use]
    pub const fn gate(&self) -> ControlGate {
        self.gate
    }

    /// Whether input is being applied.
    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        self.gate == ControlGate::ControlsEnabled
    }

    /// Hands control to the player. Returns `true` only on the first call.
    pub fn enable_controls(&mut self) -> bool {
        match self.gate {
            ControlGate::AscendPending => {
                self.gate = ControlGate::ControlsEnabled;
                true
            },
            ControlGate::ControlsEnabled => false,
        }
    }

    /// Sets the altitude directly (intro animation). Constraints still apply
    /// on the next tick.
    pub fn place_altitude(&mut self, y: f32) {
        self.pose.position.y = y;
    }

    /// Advances one tick of `dt` seconds.
    pub fn tick(&mut self, input: InputFlags, dt: f32, ground: &impl HeightQuery) -> VehiclePose {
        if self.controls_enabled() {
            self.pose.yaw += input.turn() * self.config.rotation_speed * dt;
            let step = self.config.flight_speed * dt;
            let facing = self.pose.facing();
            self.pose.position += facing * (input.thrust() * step);
            self.pose.position.y += input.lift() * step;
        }
        self.apply_constraints(ground);
        self.pose
    }

    fn apply_constraints(&mut self, ground: &impl HeightQuery) {
        let position = &mut self.pose.position;
        let floor = ground.height_at(position.x, position.z) + self.config.ground_clearance;
        position.y = position.y.max(floor);
        position.y = position.y.min(self.config.max_flying_height);
    }
}
