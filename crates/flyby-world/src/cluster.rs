//! Decorative clusters: clouds and ambient particles.
//!
//! Placement is random and need not survive eviction, but every cluster of a
//! kind has the same part count and size ranges.

use flyby_common::{ChunkCoord, WorldError, WorldResult};
use glam::Vec3;

use crate::registry::Segment;
use crate::render::{Material, Renderable, SegmentKind};

/// Clouds per cloud cluster.
pub const CLOUDS_PER_CLUSTER: usize = 3;
/// Spheres per cloud.
pub const PUFFS_PER_CLOUD: usize = 3;
/// Spheres per particle cluster.
pub const PARTICLES_PER_CLUSTER: usize = 10;

/// Kind of decorative cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterKind {
    /// Soft white puffs high above the terrain
    Cloud,
    /// Small colored spheres at flying height
    Particles,
}

impl ClusterKind {
    /// Number of parts every cluster of this kind holds.
    #[must_use]
    pub const fn part_count(self) -> usize {
        match self {
            Self::Cloud => CLOUDS_PER_CLUSTER * PUFFS_PER_CLOUD,
            Self::Particles => PARTICLES_PER_CLUSTER,
        }
    }
}

impl From<ClusterKind> for SegmentKind {
    fn from(kind: ClusterKind) -> Self {
        match kind {
            ClusterKind::Cloud => SegmentKind::Cloud,
            ClusterKind::Particles => SegmentKind::Particle,
        }
    }
}

/// One sphere of a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterPart {
    /// Center relative to the cluster's base anchor
    pub center: Vec3,
    /// Sphere radius
    pub radius: f32,
}

/// A group of spheres tied to one chunk coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorativeCluster {
    /// Kind
    kind: ClusterKind,
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Chunk origin at creation
    base_anchor: Vec3,
    /// Accumulated ambient drift
    offset: Vec3,
    /// Spheres
    parts: Vec<ClusterPart>,
    /// Shared material
    material: Material,
}

impl DecorativeCluster {
    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> ClusterKind {
        self.kind
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the spheres.
    #[must_use]
    pub fn parts(&self) -> &[ClusterPart] {
        &self.parts
    }

    /// Returns the material.
    #[must_use]
    pub const fn material(&self) -> &Material {
        &self.material
    }

    /// Accumulated drift from the chunk origin.
    #[must_use]
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Moves the whole cluster.
    pub fn translate(&mut self, delta: Vec3) {
        self.offset += delta;
    }
}

impl Segment for DecorativeCluster {
    fn anchor(&self) -> Vec3 {
        self.base_anchor + self.offset
    }

    fn renderable(&self) -> Renderable<'_> {
        Renderable::Cluster {
            anchor: self.anchor(),
            parts: &self.parts,
            material: &self.material,
        }
    }
}

/// Builds decorative clusters of one kind.
#[derive(Debug, Clone)]
pub struct ClusterFactory {
    /// Kind built
    kind: ClusterKind,
    /// Chunk side length
    segment_size: f32,
    /// Placement randomness
    rng: fastrand::Rng,
}

impl ClusterFactory {
    /// Creates a factory seeded from system entropy.
    #[must_use]
    pub fn new(kind: ClusterKind, segment_size: f32) -> Self {
        Self {
            kind,
            segment_size,
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a factory with reproducible placement.
    #[must_use]
    pub fn with_seed(kind: ClusterKind, segment_size: f32, seed: u64) -> Self {
        Self {
            kind,
            segment_size,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Kind built by this factory.
    #[must_use]
    pub const fn kind(&self) -> ClusterKind {
        self.kind
    }

    /// Builds a fresh cluster at `coord`.
    pub fn build(&mut self, coord: ChunkCoord) -> WorldResult<DecorativeCluster> {
        let mut parts = Vec::new();
        parts
            .try_reserve_exact(self.kind.part_count())
            .map_err(|e| WorldError::ConstructionFailed {
                x: coord.x,
                z: coord.z,
                reason: format!("cluster parts: {e}"),
            })?;

        let material = match self.kind {
            ClusterKind::Cloud => {
                self.place_clouds(&mut parts);
                Material::Toon {
                    color: [1.0, 1.0, 1.0],
                    opacity: self.range(0.5, 0.8),
                }
            },
            ClusterKind::Particles => {
                self.place_particles(&mut parts);
                Material::Toon {
                    color: [self.rng.f32(), self.rng.f32(), self.rng.f32()],
                    opacity: 0.8,
                }
            },
        };

        Ok(DecorativeCluster {
            kind: self.kind,
            coord,
            base_anchor: coord.origin(self.segment_size),
            offset: Vec3::ZERO,
            parts,
            material,
        })
    }

    fn place_clouds(&mut self, parts: &mut Vec<ClusterPart>) {
        for _ in 0..CLOUDS_PER_CLUSTER {
            let center = Vec3::new(
                self.range(0.0, self.segment_size),
                self.range(20.0, 30.0),
                self.range(0.0, self.segment_size),
            );
            for _ in 0..PUFFS_PER_CLOUD {
                let puff = Vec3::new(
                    self.range(-7.5, 7.5),
                    self.range(-2.5, 2.5),
                    self.range(-5.0, 5.0),
                );
                parts.push(ClusterPart {
                    center: center + puff,
                    radius: self.range(5.0, 8.0),
                });
            }
        }
    }

    fn place_particles(&mut self, parts: &mut Vec<ClusterPart>) {
        for _ in 0..PARTICLES_PER_CLUSTER {
            let center = Vec3::new(
                self.range(0.0, self.segment_size),
                self.range(10.0, 40.0),
                self.range(0.0, self.segment_size),
            );
            parts.push(ClusterPart {
                center,
                radius: self.range(0.2, 0.7),
            });
        }
    }

    /// Uniform sample in `[lo, hi)`.
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.rng.f32() * (hi - lo)
    }
}
