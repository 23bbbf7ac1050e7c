//! Chunk coordinates on the horizontal world grid.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Chunk coordinate (identifies a square region of the XZ plane).
///
/// Chunk `(x, z)` covers world positions from `x * size` to
/// `(x + 1) * size` along X, and likewise along Z.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Z coordinate in chunk space
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts a world position to the chunk containing it.
    ///
    /// Uses floor division, so `-0.5` lands in chunk `-1`, not `0`.
    #[must_use]
    pub fn from_world(x: f32, z: f32, segment_size: f32) -> Self {
        Self {
            x: (x / segment_size).floor() as i32,
            z: (z / segment_size).floor() as i32,
        }
    }

    /// Converts a full world position (height ignored).
    #[must_use]
    pub fn containing(position: Vec3, segment_size: f32) -> Self {
        Self::from_world(position.x, position.z, segment_size)
    }

    /// World-space anchor of the chunk: its minimum corner at ground level.
    #[must_use]
    pub fn origin(self, segment_size: f32) -> Vec3 {
        Vec3::new(
            self.x as f32 * segment_size,
            0.0,
            self.z as f32 * segment_size,
        )
    }

    /// Chebyshev (chessboard) distance in chunk units.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).unsigned_abs();
        dx.max(dz) as u32
    }

    /// Iterates every coordinate within `range` (Chebyshev) of this one,
    /// row by row, `(2 * range + 1)^2` coordinates in total.
    ///
    /// The square is clipped at the edges of the `i32` grid, so near
    /// `i32::MIN`/`i32::MAX` fewer coordinates are produced.
    pub fn neighborhood(self, range: u32) -> impl Iterator<Item = ChunkCoord> {
        let span = |center: i32| {
            let r = i64::from(range);
            let low = (i64::from(center) - r).max(i64::from(i32::MIN)) as i32;
            let high = (i64::from(center) + r).min(i64::from(i32::MAX)) as i32;
            low..=high
        };
        let zs = span(self.z);
        span(self.x).flat_map(move |x| zs.clone().map(move |z| ChunkCoord::new(x, z)))
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_world_floors_negative() {
        assert_eq!(ChunkCoord::from_world(-0.5, 0.0, 100.0), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::from_world(-100.0, 99.9, 100.0), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::from_world(250.0, -250.0, 100.0), ChunkCoord::new(2, -3));
    }

    #[test]
    fn test_negative_keys_distinct() {
        // "-1_1" vs "-11" style collisions cannot happen with a structured key
        let a = ChunkCoord::new(-1, 1);
        let b = ChunkCoord::new(-11, 0);
        let c = ChunkCoord::new(1, -1);
        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_neighborhood_size() {
        let coords: Vec<_> = ChunkCoord::new(3, -4).neighborhood(2).collect();
        assert_eq!(coords.len(), 25);
        assert!(coords
            .iter()
            .all(|c| c.chebyshev_distance(ChunkCoord::new(3, -4)) <= 2));
        let unique: HashSet<_> = coords.iter().copied().collect();
        assert_eq!(unique.len(), 25);
    }

    #[test]
    fn test_neighborhood_zero_range() {
        let coords: Vec<_> = ChunkCoord::new(7, 7).neighborhood(0).collect();
        assert_eq!(coords, vec![ChunkCoord::new(7, 7)]);
    }

    #[test]
    fn test_neighborhood_clipped_at_grid_edge() {
        let edge = ChunkCoord::new(i32::MAX, i32::MIN);
        let coords: Vec<_> = edge.neighborhood(2).collect();
        assert_eq!(coords.len(), 9);
        assert!(coords.contains(&edge));
        assert!(coords.contains(&ChunkCoord::new(i32::MAX - 2, i32::MIN + 2)));

        let all: Vec<_> = ChunkCoord::new(0, 0).neighborhood(u32::MAX).take(3).collect();
        assert_eq!(all[0], ChunkCoord::new(i32::MIN, i32::MIN));
    }

    #[test]
    fn test_default_is_origin_chunk() {
        assert_eq!(ChunkCoord::default(), ChunkCoord::new(0, 0));
    }

    #[test]
    fn test_origin() {
        let origin = ChunkCoord::new(-2, 3).origin(100.0);
        assert_eq!(origin, Vec3::new(-200.0, 0.0, 300.0));
    }

    proptest! {
        #[test]
        fn prop_position_inside_its_chunk(xi in -80_000i32..80_000, zi in -80_000i32..80_000) {
            // eighths are exact in f32, keeping positions off the rounding edge
            let (x, z) = (xi as f32 / 8.0, zi as f32 / 8.0);
            let size = 100.0;
            let coord = ChunkCoord::from_world(x, z, size);
            let origin = coord.origin(size);
            prop_assert!(origin.x <= x && x < origin.x + size);
            prop_assert!(origin.z <= z && z < origin.z + size);
        }
    }
}
