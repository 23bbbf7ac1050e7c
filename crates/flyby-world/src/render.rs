//! Render surface seam.
//!
//! The world never talks to a GPU. It hands each new segment to a
//! [`RenderSurface`] as a borrowed [`Renderable`] and asks the surface to
//! dispose of it once the segment has been unlinked from its registry.

use ahash::AHashSet;
use flyby_common::ChunkCoord;
use glam::Vec3;
use tracing::trace;

use crate::chunk::TerrainMesh;
use crate::cluster::ClusterPart;

/// Which registry a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Terrain chunk
    Terrain,
    /// Cloud cluster
    Cloud,
    /// Ambient particle cluster
    Particle,
}

impl SegmentKind {
    /// All kinds, in streaming order.
    pub const ALL: [Self; 3] = [Self::Terrain, Self::Cloud, Self::Particle];

    /// Short label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::Cloud => "cloud",
            Self::Particle => "particle",
        }
    }
}

/// Surface shading description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Lit material using per-vertex colors (terrain)
    Standard {
        /// Surface roughness (0-1)
        roughness: f32,
        /// Metalness (0-1)
        metalness: f32,
    },
    /// Flat toon shading with a single color
    Toon {
        /// Linear RGB color
        color: [f32; 3],
        /// Opacity (0-1)
        opacity: f32,
    },
}

/// Borrowed view of a segment handed to the render surface.
#[derive(Debug, Clone, Copy)]
pub enum Renderable<'a> {
    /// Heightmap mesh positioned at `anchor`
    Terrain {
        /// World-space anchor of the mesh
        anchor: Vec3,
        /// Mesh in anchor-local space
        mesh: &'a TerrainMesh,
        /// Material
        material: &'a Material,
    },
    /// Group of spheres positioned relative to `anchor`
    Cluster {
        /// World-space anchor of the group
        anchor: Vec3,
        /// Spheres in anchor-local space
        parts: &'a [ClusterPart],
        /// Shared material
        material: &'a Material,
    },
}

/// Consumer of segment geometry.
pub trait RenderSurface {
    /// Called once when a segment is created.
    fn submit(&mut self, kind: SegmentKind, coord: ChunkCoord, renderable: Renderable<'_>);

    /// Called once after a segment has been removed from its registry.
    fn dispose(&mut self, kind: SegmentKind, coord: ChunkCoord);
}

/// Surface that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn submit(&mut self, _kind: SegmentKind, _coord: ChunkCoord, _renderable: Renderable<'_>) {}

    fn dispose(&mut self, _kind: SegmentKind, _coord: ChunkCoord) {}
}

/// Surface that tracks which segments are live, for headless runs and tests.
#[derive(Debug, Default)]
pub struct CountingSurface {
    /// Segments submitted and not yet disposed
    live: AHashSet<(SegmentKind, ChunkCoord)>,
    /// Total submissions
    submitted: usize,
    /// Total disposals
    disposed: usize,
    /// Total vertices across submitted terrain meshes
    terrain_vertices: usize,
    /// Submissions for a segment that was already live
    double_submits: usize,
    /// Disposals for a segment that was not live
    stray_disposals: usize,
}

impl CountingSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the given segment is currently live.
    #[must_use]
    pub fn is_live(&self, kind: SegmentKind, coord: ChunkCoord) -> bool {
        self.live.contains(&(kind, coord))
    }

    /// Number of live segments of one kind.
    #[must_use]
    pub fn live_count(&self, kind: SegmentKind) -> usize {
        self.live.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Total submissions so far.
    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }

    /// Total disposals so far.
    #[must_use]
    pub const fn disposed(&self) -> usize {
        self.disposed
    }

    /// Total terrain vertices submitted so far.
    #[must_use]
    pub const fn terrain_vertices(&self) -> usize {
        self.terrain_vertices
    }

    /// Submit/dispose calls that did not match the live set.
    #[must_use]
    pub const fn mismatches(&self) -> usize {
        self.double_submits + self.stray_disposals
    }
}

impl RenderSurface for CountingSurface {
    fn submit(&mut self, kind: SegmentKind, coord: ChunkCoord, renderable: Renderable<'_>) {
        if let Renderable::Terrain { mesh, .. } = renderable {
            self.terrain_vertices += mesh.vertex_count();
        }
        if !self.live.insert((kind, coord)) {
            self.double_submits += 1;
        }
        self.submitted += 1;
        trace!("submit {} {coord}", kind.label());
    }

    fn dispose(&mut self, kind: SegmentKind, coord: ChunkCoord) {
        if !self.live.remove(&(kind, coord)) {
            self.stray_disposals += 1;
        }
        self.disposed += 1;
        trace!("dispose {} {coord}", kind.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TOON: Material = Material::Toon {
        color: [1.0, 1.0, 1.0],
        opacity: 0.5,
    };

    fn empty_cluster() -> Renderable<'static> {
        Renderable::Cluster {
            anchor: Vec3::ZERO,
            parts: &[],
            material: &TOON,
        }
    }

    #[test]
    fn test_counting_surface_tracks_live_set() {
        let mut surface = CountingSurface::new();
        let coord = ChunkCoord::new(1, -1);
        surface.submit(SegmentKind::Cloud, coord, empty_cluster());
        assert!(surface.is_live(SegmentKind::Cloud, coord));
        assert!(!surface.is_live(SegmentKind::Particle, coord));
        assert_eq!(surface.live_count(SegmentKind::Cloud), 1);

        surface.dispose(SegmentKind::Cloud, coord);
        assert!(!surface.is_live(SegmentKind::Cloud, coord));
        assert_eq!(surface.submitted(), 1);
        assert_eq!(surface.disposed(), 1);
        assert_eq!(surface.mismatches(), 0);
    }

    #[test]
    fn test_counting_surface_flags_mismatches() {
        let mut surface = CountingSurface::new();
        let coord = ChunkCoord::new(0, 0);
        surface.dispose(SegmentKind::Terrain, coord);
        surface.submit(SegmentKind::Cloud, coord, empty_cluster());
        surface.submit(SegmentKind::Cloud, coord, empty_cluster());
        assert_eq!(surface.mismatches(), 2);
    }
}
