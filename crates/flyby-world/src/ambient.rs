//! Ambient motion of decorative clusters.

use glam::Vec3;

use crate::cluster::DecorativeCluster;
use crate::config::WorldConfig;
use crate::registry::SegmentRegistry;

/// How particle clusters move this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleFlow {
    /// Slow diagonal drift
    #[default]
    Drift,
    /// Streaming past the vehicle, against its heading
    Opposite,
}

/// Moves clouds back and forth and particles past the vehicle.
#[derive(Debug, Clone)]
pub struct AmbientMotion {
    /// +1 or -1 along X
    cloud_direction: f32,
    /// Seconds since the last reversal
    since_switch: f32,
    /// Seconds between reversals
    switch_interval: f32,
    /// Cloud speed (units per second)
    cloud_speed: f32,
    /// Idle particle speed per axis
    particle_drift: f32,
    /// Particle speed while the vehicle drives
    particle_rush: f32,
}

impl AmbientMotion {
    /// Creates ambient motion from world configuration.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            cloud_direction: 1.0,
            since_switch: 0.0,
            switch_interval: config.cloud_switch_interval,
            cloud_speed: config.cloud_drift_speed,
            particle_drift: config.particle_drift_speed,
            particle_rush: config.particle_rush_speed,
        }
    }

    /// Current cloud direction along X (`1.0` or `-1.0`).
    #[must_use]
    pub const fn cloud_direction(&self) -> f32 {
        self.cloud_direction
    }

    /// Advances all clusters by `dt` seconds.
    ///
    /// `facing` is the vehicle's unit heading, used by [`ParticleFlow::Opposite`].
    pub fn advance(
        &mut self,
        dt: f32,
        flow: ParticleFlow,
        facing: Vec3,
        clouds: &mut SegmentRegistry<DecorativeCluster>,
        particles: &mut SegmentRegistry<DecorativeCluster>,
    ) {
        self.since_switch += dt;
        while self.since_switch >= self.switch_interval {
            self.since_switch -= self.switch_interval;
            self.cloud_direction = -self.cloud_direction;
        }

        let cloud_step = Vec3::X * (self.cloud_direction * self.cloud_speed * dt);
        for cloud in clouds.values_mut() {
            cloud.translate(cloud_step);
        }

        let particle_step = match flow {
            ParticleFlow::Drift => Vec3::new(self.particle_drift, 0.0, self.particle_drift) * dt,
            ParticleFlow::Opposite => -facing * self.particle_rush * dt,
        };
        for cluster in particles.values_mut() {
            cluster.translate(particle_step);
        }
    }
}
