//! Headless demo loop.
//!
//! Spawns a [`Session`] on a [`CountingSurface`], plays the intro descent,
//! then flies a scripted route and logs streaming statistics as it goes.

use anyhow::{Context, Result};
use flyby_gameplay::{InputFlags, Session, VehiclePose};
use flyby_world::{CountingSurface, SegmentKind};
use tracing::info;

use crate::config::EngineConfig;
use crate::intro::{AscentStep, ScriptedAscent};
use crate::timing::{FrameTiming, TickRate};

/// Scripted route: long straight runs broken up by turns and altitude
/// changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Autopilot;

impl Autopilot {
    /// Length of one loop of the route in seconds.
    pub const PERIOD: f32 = 16.0;

    /// Input at `t` seconds after controls were enabled.
    #[must_use]
    pub fn input_at(self, t: f32) -> InputFlags {
        let phase = t.rem_euclid(Self::PERIOD);
        let mut input = InputFlags {
            forward: true,
            ..InputFlags::NONE
        };
        match phase {
            p if p < 8.0 => {},
            p if p < 9.5 => input.yaw_left = true,
            p if p < 11.0 => input.up = true,
            p if p < 13.0 => input.down = true,
            p if p < 14.0 => input.yaw_right = true,
            _ => input.forward = false,
        }
        input
    }
}

/// What a demo run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoSummary {
    /// Frames ticked
    pub frames: u64,
    /// Final vehicle pose
    pub pose: VehiclePose,
    /// Whether the intro handed over control
    pub controls_enabled: bool,
    /// Streaming passes, including the one at spawn
    pub streaming_passes: u64,
    /// Segments loaded at the end
    pub loaded: usize,
    /// Segments submitted to the surface
    pub submitted: usize,
    /// Segments disposed from the surface
    pub disposed: usize,
    /// Vertices across every terrain mesh submitted
    pub terrain_vertices: usize,
    /// Submit/dispose calls that did not match the live set
    pub mismatches: usize,
}

/// Runs the demo to completion.
pub fn run(mut config: EngineConfig) -> Result<DemoSummary> {
    config.validate();

    let world = config.world.clone();
    let flight = config.flight.clone();
    let spawn_altitude = flight.spawn.y;
    let mut session = match config.cluster_seed {
        Some(seed) => Session::seeded(world, flight, CountingSurface::new(), seed),
        None => Session::new(world, flight, CountingSurface::new()),
    }
    .context("Invalid world or flight configuration")?;

    let mut timing = FrameTiming::new(config.target_fps).with_realtime(config.realtime);
    let mut rate = TickRate::default();
    let mut intro = ScriptedAscent::new(
        spawn_altitude,
        config.intro_target_altitude,
        config.intro_seconds,
    );
    let autopilot = Autopilot;

    let total_frames = (f64::from(config.demo_seconds) * f64::from(config.target_fps)).round() as u64;
    let log_every = (f64::from(config.log_every_secs) * f64::from(config.target_fps)).round() as u64;
    let mut controls_since = 0.0_f32;

    info!(
        "Flying for {:.1}s at {} fps (dt {:.4}s, {} frames)",
        config.demo_seconds,
        config.target_fps,
        timing.fixed_dt(),
        total_frames
    );

    for _ in 0..total_frames {
        let dt = timing.begin_frame();

        let input = match intro.step(dt) {
            AscentStep::Descending(y) => {
                session.place_altitude(y);
                InputFlags::NONE
            },
            AscentStep::Landed(y) => {
                session.place_altitude(y);
                session.enable_controls();
                InputFlags::NONE
            },
            AscentStep::Done => {
                controls_since += dt;
                autopilot.input_at(controls_since)
            },
        };

        let pose = session.tick(input, dt);
        rate.tick();
        timing.end_frame();

        if log_every > 0 && timing.frame() % log_every == 0 {
            log_progress(&session, pose, timing.sim_time(), rate.per_second());
        }
    }

    if !intro.is_finished() {
        info!("Demo ended before the intro finished");
    }

    let surface = session.surface();
    let summary = DemoSummary {
        frames: timing.frame(),
        pose: session.pose(),
        controls_enabled: session.controls_enabled(),
        streaming_passes: session.streaming_passes(),
        loaded: session.segments().total(),
        submitted: surface.submitted(),
        disposed: surface.disposed(),
        terrain_vertices: surface.terrain_vertices(),
        mismatches: surface.mismatches(),
    };

    info!(
        "Demo finished: {} frames, {} streaming passes, {} submitted, {} disposed, {} terrain vertices meshed",
        summary.frames,
        summary.streaming_passes,
        summary.submitted,
        summary.disposed,
        summary.terrain_vertices
    );
    Ok(summary)
}

fn log_progress(session: &Session<CountingSurface>, pose: VehiclePose, sim_time: f64, tps: f32) {
    let position = pose.position;
    let surface = session.surface();
    let live = SegmentKind::ALL
        .map(|kind| format!("{}={}", kind.label(), surface.live_count(kind)))
        .join(" ");
    info!(
        "t={sim_time:.1}s pos=({:.1}, {:.1}, {:.1}) ground={:.2} {live} ({tps:.0} ticks/s)",
        position.x,
        position.y,
        position.z,
        session.height_at(position.x, position.z),
    );
}
