//! Ground elevation queries over loaded terrain.

use flyby_common::ChunkCoord;

use crate::chunk::TerrainChunk;
use crate::registry::SegmentRegistry;

/// Elevation returned when no loaded chunk answers a query.
pub const QUERY_MISS_HEIGHT: f32 = 0.0;

/// Anything that can report ground elevation.
pub trait HeightQuery {
    /// Ground elevation at world `(x, z)`.
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Approximate height field over the currently loaded terrain chunks.
///
/// This is a nearest-vertex lookup, not interpolation. A query inspects at
/// most the four chunks whose closed footprint can contain the point and, in
/// each, only the vertices within tolerance. When nothing matches the answer
/// is [`QUERY_MISS_HEIGHT`], including before the first streaming pass and
/// far outside the streamed area.
#[derive(Debug, Clone, Copy)]
pub struct HeightField<'a> {
    /// Loaded terrain
    terrain: &'a SegmentRegistry<TerrainChunk>,
    /// Chunk side length
    segment_size: f32,
    /// Per-axis match tolerance
    tolerance: f32,
}

impl<'a> HeightField<'a> {
    /// Creates a height field view.
    #[must_use]
    pub const fn new(
        terrain: &'a SegmentRegistry<TerrainChunk>,
        segment_size: f32,
        tolerance: f32,
    ) -> Self {
        Self {
            terrain,
            segment_size,
            tolerance,
        }
    }

    /// Highest matching vertex elevation, or `None` on a miss.
    #[must_use]
    pub fn lookup(&self, x: f32, z: f32) -> Option<f32> {
        let home = ChunkCoord::from_world(x, z, self.segment_size);
        // A point on a chunk edge is also covered by the neighbor below it
        let candidates = [
            home,
            ChunkCoord::new(home.x - 1, home.z),
            ChunkCoord::new(home.x, home.z - 1),
            ChunkCoord::new(home.x - 1, home.z - 1),
        ];

        candidates
            .into_iter()
            .filter_map(|coord| self.terrain.get(coord))
            .filter(|chunk| chunk.covers(x, z))
            .filter_map(|chunk| chunk.max_elevation_near(x, z, self.tolerance))
            .reduce(f32::max)
    }
}

impl HeightQuery for HeightField<'_> {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.lookup(x, z).unwrap_or(QUERY_MISS_HEIGHT)
    }
}

/// Flat ground at a fixed elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround(pub f32);

impl HeightQuery for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}
