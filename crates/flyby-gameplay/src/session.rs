//! The flight session: one owning context for the world and the vehicle.

use flyby_common::ConfigError;
use flyby_world::{
    AmbientMotion, ClusterFactory, ClusterKind, HeightField, HeightQuery, ParticleFlow,
    RenderSurface, StreamingOrchestrator, WorldConfig, WorldSegments,
};
use glam::Vec3;
use tracing::{debug, info};

use crate::flight::{FlightConfig, FlightController, VehiclePose};
use crate::input::InputFlags;

/// Everything a running flyby needs, advanced one frame at a time.
#[derive(Debug)]
pub struct Session<S: RenderSurface> {
    world: WorldConfig,
    segments: WorldSegments,
    streamer: StreamingOrchestrator,
    flight: FlightController,
    ambient: AmbientMotion,
    surface: S,
    ticks: u64,
}

impl<S: RenderSurface> Session<S> {
    /// Validates configuration, spawns the vehicle and streams the world
    /// around the spawn point.
    pub fn new(world: WorldConfig, flight: FlightConfig, surface: S) -> Result<Self, ConfigError> {
        world.validate()?;
        flight.validate()?;
        let streamer = StreamingOrchestrator::new(&world, flight.spawn);
        Ok(Self::start(world, flight, streamer, surface))
    }

    /// Like [`Session::new`] but with reproducible cloud and particle
    /// placement.
    pub fn seeded(
        world: WorldConfig,
        flight: FlightConfig,
        surface: S,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        world.validate()?;
        flight.validate()?;
        let streamer = StreamingOrchestrator::with_cluster_factories(
            &world,
            flight.spawn,
            ClusterFactory::with_seed(ClusterKind::Cloud, world.segment_size, seed),
            ClusterFactory::with_seed(
                ClusterKind::Particles,
                world.segment_size,
                seed.wrapping_add(1),
            ),
        );
        Ok(Self::start(world, flight, streamer, surface))
    }

    fn start(
        world: WorldConfig,
        flight: FlightConfig,
        mut streamer: StreamingOrchestrator,
        mut surface: S,
    ) -> Self {
        let spawn = flight.spawn;
        let mut segments = WorldSegments::new();
        let report = streamer.stream(spawn, &mut segments, &mut surface);

        info!(
            "Session started at {spawn} (terrain seed {}): {} segments loaded",
            streamer.terrain_factory().noise().seed(),
            report.created.total()
        );

        Self {
            ambient: AmbientMotion::new(&world),
            flight: FlightController::new(flight),
            world,
            segments,
            streamer,
            surface,
            ticks: 0,
        }
    }

    /// Advances one frame: flight, then streaming, then ambient motion.
    pub fn tick(&mut self, input: InputFlags, dt: f32) -> VehiclePose {
        let ground = HeightField::new(
            &self.segments.terrain,
            self.world.segment_size,
            self.world.height_tolerance,
        );
        let pose = self.flight.tick(input, dt, &ground);

        if let Some(report) =
            self.streamer
                .update(pose.position, &mut self.segments, &mut self.surface)
        {
            debug!(
                "Tick {}: streamed around {} ({} terrain chunks loaded)",
                self.ticks,
                report.center,
                self.segments.terrain.len()
            );
        }

        let flow = if self.flight.controls_enabled() && input.is_driving() {
            ParticleFlow::Opposite
        } else {
            ParticleFlow::Drift
        };
        self.ambient.advance(
            dt,
            flow,
            pose.facing(),
            &mut self.segments.clouds,
            &mut self.segments.particles,
        );

        self.ticks += 1;
        pose
    }

    /// Ground elevation at `(x, z)` over the loaded terrain.
    #[must_use]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        HeightField::new(
            &self.segments.terrain,
            self.world.segment_size,
            self.world.height_tolerance,
        )
        .height_at(x, z)
    }

    /// Ends the intro and hands control to the player.
    pub fn enable_controls(&mut self) -> bool {
        let enabled = self.flight.enable_controls();
        if enabled {
            info!("Controls enabled at {}", self.flight.pose().position);
        }
        enabled
    }

    /// Whether input is applied.
    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        self.flight.controls_enabled()
    }

    /// Places the vehicle at altitude `y` (intro animation).
    pub fn place_altitude(&mut self, y: f32) {
        self.flight.place_altitude(y);
    }

    /// Current vehicle pose.
    #[must_use]
    pub const fn pose(&self) -> VehiclePose {
        self.flight.pose()
    }

    /// Loaded segments.
    #[must_use]
    pub const fn segments(&self) -> &WorldSegments {
        &self.segments
    }

    /// The render surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// World configuration.
    #[must_use]
    pub const fn world_config(&self) -> &WorldConfig {
        &self.world
    }

    /// Position of the last streaming pass.
    #[must_use]
    pub const fn last_streamed(&self) -> Vec3 {
        self.streamer.last_streamed()
    }

    /// Streaming passes run, including the one at spawn.
    #[must_use]
    pub const fn streaming_passes(&self) -> u64 {
        self.streamer.passes()
    }

    /// Frames ticked.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyby_common::ChunkCoord;
    use flyby_world::{CountingSurface, NoiseField, Segment, SegmentKind, QUERY_MISS_HEIGHT};

    fn session() -> Session<CountingSurface> {
        Session::seeded(
            WorldConfig::default(),
            FlightConfig::default(),
            CountingSurface::new(),
            7,
        )
        .expect("default config is valid")
    }

    #[test]
    fn test_spawn_streams_square() {
        let session = session();
        let expected: Vec<ChunkCoord> = (-2..=2)
            .flat_map(|x| (-2..=2).map(move |z| ChunkCoord::new(x, z)))
            .collect();
        assert_eq!(session.segments().terrain.coords(), expected);
        assert_eq!(session.segments().clouds.len(), 25);
        assert_eq!(session.streaming_passes(), 1);
        assert_eq!(session.surface().live_count(SegmentKind::Terrain), 25);
        for (_, chunk) in session.segments().terrain.iter() {
            assert!(chunk.anchor().distance(session.last_streamed()) <= 300.0);
        }
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let world = WorldConfig {
            segment_size: 0.0,
            ..Default::default()
        };
        let result = Session::new(world, FlightConfig::default(), CountingSurface::new());
        assert!(matches!(
            result,
            Err(ConfigError::NonPositive {
                field: "segment_size",
                ..
            })
        ));
    }

    #[test]
    fn test_height_matches_terrain_noise() {
        let session = session();
        let noise = NoiseField::from_config(session.world_config());
        assert_eq!(session.height_at(12.5, 37.5), noise.elevation(12.5, 37.5));
        assert_eq!(session.height_at(9000.0, 9000.0), QUERY_MISS_HEIGHT);
    }

    #[test]
    fn test_gated_tick_ignores_input() {
        let mut session = session();
        let input = InputFlags::from_keys(["ArrowUp", "ArrowLeft"]);
        let pose = session.tick(input, 1.0);
        assert_eq!(pose.position.x, 0.0);
        assert_eq!(pose.position.z, 0.0);
        assert_eq!(pose.yaw, 0.0);
        // Ceiling still applies
        assert_eq!(pose.position.y, 60.0);
        assert!(!session.controls_enabled());
    }

    #[test]
    fn test_enable_controls_once() {
        let mut session = session();
        assert!(session.enable_controls());
        assert!(!session.enable_controls());
        assert!(session.controls_enabled());
    }

    #[test]
    fn test_streaming_triggers_on_displacement() {
        let mut session = session();
        let forward = InputFlags {
            forward: true,
            ..InputFlags::NONE
        };

        // Dropping from 100 to the 60 ceiling is 40 units: below threshold
        session.tick(forward, 1.0);
        assert_eq!(session.streaming_passes(), 1);

        session.enable_controls();
        // 30 forward and 40 down from spawn: exactly 50
        let pose = session.tick(forward, 1.0);
        assert_eq!(pose.position, Vec3::new(0.0, 60.0, 30.0));
        assert_eq!(session.streaming_passes(), 2);
        assert_eq!(session.last_streamed(), pose.position);
    }

    #[test]
    fn test_long_flight_keeps_surface_in_sync() {
        let mut session = session();
        session.enable_controls();
        let forward = InputFlags {
            forward: true,
            ..InputFlags::NONE
        };
        for _ in 0..600 {
            session.tick(forward, 1.0 / 60.0 * 10.0);
        }
        let pose = session.pose();
        assert!(pose.position.z > 2500.0);
        assert!(session.segments().terrain.contains(ChunkCoord::containing(
            pose.position,
            session.world_config().segment_size
        )));
        assert!(!session.segments().terrain.contains(ChunkCoord::new(0, 0)));
        let surface = session.surface();
        assert_eq!(surface.mismatches(), 0);
        assert_eq!(
            surface.live_count(SegmentKind::Terrain),
            session.segments().terrain.len()
        );
        assert_eq!(session.ticks(), 600);
    }
}
