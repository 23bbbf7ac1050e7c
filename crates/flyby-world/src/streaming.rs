//! World streaming: ensuring nearby segments and evicting distant ones.

use flyby_common::{ChunkCoord, WorldResult};
use glam::Vec3;
use tracing::{debug, warn};

use crate::chunk::TerrainChunk;
use crate::cluster::{ClusterFactory, ClusterKind, DecorativeCluster};
use crate::config::WorldConfig;
use crate::generation::TerrainChunkFactory;
use crate::registry::{Segment, SegmentRegistry};
use crate::render::{RenderSurface, SegmentKind};

/// The three segment registries, owned together by the session.
#[derive(Debug)]
pub struct WorldSegments {
    /// Terrain chunks
    pub terrain: SegmentRegistry<TerrainChunk>,
    /// Cloud clusters
    pub clouds: SegmentRegistry<DecorativeCluster>,
    /// Ambient particle clusters
    pub particles: SegmentRegistry<DecorativeCluster>,
}

impl WorldSegments {
    /// Creates empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            terrain: SegmentRegistry::new(SegmentKind::Terrain),
            clouds: SegmentRegistry::new(SegmentKind::Cloud),
            particles: SegmentRegistry::new(SegmentKind::Particle),
        }
    }

    /// Total loaded segments across all registries.
    #[must_use]
    pub fn total(&self) -> usize {
        self.terrain.len() + self.clouds.len() + self.particles.len()
    }
}

impl Default for WorldSegments {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-kind counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentCounts {
    /// Terrain chunks
    pub terrain: usize,
    /// Cloud clusters
    pub clouds: usize,
    /// Particle clusters
    pub particles: usize,
}

impl SegmentCounts {
    /// Sum over all kinds.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.terrain + self.clouds + self.particles
    }

    fn slot(&mut self, kind: SegmentKind) -> &mut usize {
        match kind {
            SegmentKind::Terrain => &mut self.terrain,
            SegmentKind::Cloud => &mut self.clouds,
            SegmentKind::Particle => &mut self.particles,
        }
    }
}

/// Outcome of one streaming pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamingReport {
    /// Chunk the vehicle was in
    pub center: ChunkCoord,
    /// Segments created
    pub created: SegmentCounts,
    /// Segments whose construction failed (retried next pass)
    pub failed: SegmentCounts,
    /// Segments evicted
    pub evicted: SegmentCounts,
}

/// Decides when to stream and performs streaming passes.
#[derive(Debug)]
pub struct StreamingOrchestrator {
    /// Chunk side length
    segment_size: f32,
    /// Chebyshev radius of the ensured square
    segment_range: u32,
    /// Displacement that triggers a pass
    update_threshold: f32,
    /// Eviction radius for terrain
    terrain_evict_radius: f32,
    /// Eviction radius for clouds
    cloud_evict_radius: f32,
    /// Eviction radius for particles
    particle_evict_radius: f32,
    /// Terrain synthesis
    terrain_factory: TerrainChunkFactory,
    /// Cloud placement
    cloud_factory: ClusterFactory,
    /// Particle placement
    particle_factory: ClusterFactory,
    /// Position of the last pass
    last_streamed: Vec3,
    /// Passes run so far
    passes: u64,
}

impl StreamingOrchestrator {
    /// Creates an orchestrator. No pass has run yet; `last_streamed` is the
    /// reference position for the first trigger check.
    #[must_use]
    pub fn new(config: &WorldConfig, last_streamed: Vec3) -> Self {
        Self::with_cluster_factories(
            config,
            last_streamed,
            ClusterFactory::new(ClusterKind::Cloud, config.segment_size),
            ClusterFactory::new(ClusterKind::Particles, config.segment_size),
        )
    }

    /// Creates an orchestrator with explicit cluster factories (e.g. seeded).
    #[must_use]
    pub fn with_cluster_factories(
        config: &WorldConfig,
        last_streamed: Vec3,
        cloud_factory: ClusterFactory,
        particle_factory: ClusterFactory,
    ) -> Self {
        Self {
            segment_size: config.segment_size,
            segment_range: config.segment_range,
            update_threshold: config.update_threshold,
            terrain_evict_radius: config.terrain_evict_radius,
            cloud_evict_radius: config.cloud_evict_radius,
            particle_evict_radius: config.particle_evict_radius,
            terrain_factory: TerrainChunkFactory::new(config),
            cloud_factory,
            particle_factory,
            last_streamed,
            passes: 0,
        }
    }

    /// Position at which the last pass ran.
    #[must_use]
    pub const fn last_streamed(&self) -> Vec3 {
        self.last_streamed
    }

    /// Number of passes run.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Terrain factory in use.
    #[must_use]
    pub const fn terrain_factory(&self) -> &TerrainChunkFactory {
        &self.terrain_factory
    }

    /// Whether `position` is far enough from the last pass to stream again.
    /// Moving exactly the threshold distance counts.
    #[must_use]
    pub fn should_stream(&self, position: Vec3) -> bool {
        position.distance(self.last_streamed) >= self.update_threshold
    }

    /// Runs a pass if the vehicle has moved far enough.
    pub fn update(
        &mut self,
        position: Vec3,
        segments: &mut WorldSegments,
        surface: &mut dyn RenderSurface,
    ) -> Option<StreamingReport> {
        if self.should_stream(position) {
            Some(self.stream(position, segments, surface))
        } else {
            None
        }
    }

    /// Runs a pass unconditionally.
    ///
    /// Ensures every segment in the square around the vehicle's chunk, evicts
    /// each registry with its own radius, then records `position`.
    ///
    /// Coordinates of the square whose anchor is already beyond a kind's
    /// eviction radius are not built for that kind, so a pass never creates
    /// a segment it then evicts.
    pub fn stream(
        &mut self,
        position: Vec3,
        segments: &mut WorldSegments,
        surface: &mut dyn RenderSurface,
    ) -> StreamingReport {
        let center = ChunkCoord::containing(position, self.segment_size);
        let mut report = StreamingReport {
            center,
            ..Default::default()
        };

        for coord in center.neighborhood(self.segment_range) {
            // Skip anything the eviction below would drop straight away
            let distance = coord.origin(self.segment_size).distance(position);
            if distance <= self.terrain_evict_radius {
                let terrain = &self.terrain_factory;
                ensure_segment(
                    &mut segments.terrain,
                    coord,
                    |c| terrain.build(c),
                    surface,
                    &mut report,
                );
            }
            if distance <= self.cloud_evict_radius {
                let clouds = &mut self.cloud_factory;
                ensure_segment(
                    &mut segments.clouds,
                    coord,
                    |c| clouds.build(c),
                    surface,
                    &mut report,
                );
            }
            if distance <= self.particle_evict_radius {
                let particles = &mut self.particle_factory;
                ensure_segment(
                    &mut segments.particles,
                    coord,
                    |c| particles.build(c),
                    surface,
                    &mut report,
                );
            }
        }

        report.evicted.terrain =
            segments
                .terrain
                .evict_far(position, self.terrain_evict_radius, surface);
        report.evicted.clouds = segments
            .clouds
            .evict_far(position, self.cloud_evict_radius, surface);
        report.evicted.particles =
            segments
                .particles
                .evict_far(position, self.particle_evict_radius, surface);

        self.last_streamed = position;
        self.passes += 1;

        debug!(
            "Streaming pass {} at chunk {center}: +{} -{} ({} failed), {} loaded",
            self.passes,
            report.created.total(),
            report.evicted.total(),
            report.failed.total(),
            segments.total()
        );
        report
    }
}

/// Ensures one segment and hands it to the surface if it is new.
fn ensure_segment<T, F>(
    registry: &mut SegmentRegistry<T>,
    coord: ChunkCoord,
    factory: F,
    surface: &mut dyn RenderSurface,
    report: &mut StreamingReport,
) where
    T: Segment,
    F: FnOnce(ChunkCoord) -> WorldResult<T>,
{
    let kind = registry.kind();
    match registry.ensure(coord, factory) {
        Ok(true) => {
            if let Some(segment) = registry.get(coord) {
                surface.submit(kind, coord, segment.renderable());
            }
            *report.created.slot(kind) += 1;
        },
        Ok(false) => {},
        Err(e) => {
            warn!("Skipping {} segment: {e}", kind.label());
            *report.failed.slot(kind) += 1;
        },
    }
}
