//! Terrain chunk data structure.

use flyby_common::{ChunkCoord, WorldError, WorldResult};
use glam::Vec3;

use crate::registry::Segment;
use crate::render::{Material, Renderable};

/// Material shared by every terrain chunk.
pub const TERRAIN_MATERIAL: Material = Material::Standard {
    roughness: 0.4,
    metalness: 0.1,
};

/// Triangulated heightmap in anchor-local space.
///
/// Vertices form a `resolution × resolution` grid, row-major along Z:
/// vertex `(i, j)` sits at local `(i * spacing, h, j * spacing)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    /// Vertices per side
    resolution: u32,
    /// Distance between neighboring vertices
    spacing: f32,
    /// Local vertex positions
    positions: Vec<Vec3>,
    /// Per-vertex RGB colors
    colors: Vec<[f32; 3]>,
    /// Triangle list, two triangles per grid cell
    indices: Vec<u32>,
}

impl TerrainMesh {
    /// Vertices per side.
    #[must_use]
    pub const fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Distance between neighboring vertices.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Local vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-vertex colors, parallel to [`positions`](Self::positions).
    #[must_use]
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Triangle indices.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Local position of grid vertex `(i, j)`.
    #[must_use]
    pub fn vertex(&self, i: u32, j: u32) -> Option<Vec3> {
        if i >= self.resolution || j >= self.resolution {
            return None;
        }
        self.positions
            .get((j * self.resolution + i) as usize)
            .copied()
    }
}

/// A square chunk of terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainChunk {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// World-space minimum corner
    anchor: Vec3,
    /// Side length in world units
    size: f32,
    /// Heightmap mesh
    mesh: TerrainMesh,
    /// Shading
    material: Material,
}

impl TerrainChunk {
    /// Builds a chunk by evaluating `vertex(world_x, world_z)` for every grid
    /// vertex. The closure returns the elevation and color of that vertex.
    ///
    /// Fails if the grid does not fit 32-bit indices or its buffers cannot be
    /// allocated.
    pub fn build_with<F>(
        coord: ChunkCoord,
        size: f32,
        subdivisions: u32,
        mut vertex: F,
    ) -> WorldResult<Self>
    where
        F: FnMut(f64, f64) -> (f32, [f32; 3]),
    {
        let fail = |reason: String| WorldError::ConstructionFailed {
            x: coord.x,
            z: coord.z,
            reason,
        };

        let resolution = subdivisions
            .checked_add(1)
            .ok_or_else(|| fail("subdivision count overflows".into()))?;
        let vertex_count = resolution
            .checked_mul(resolution)
            .ok_or_else(|| fail(format!("{resolution}x{resolution} grid exceeds index range")))?
            as usize;
        let index_count = (subdivisions as usize)
            .checked_mul(subdivisions as usize)
            .and_then(|cells| cells.checked_mul(6))
            .ok_or_else(|| fail("index buffer size overflows".into()))?;

        let mut positions = Vec::new();
        let mut colors = Vec::new();
        let mut indices = Vec::new();
        positions
            .try_reserve_exact(vertex_count)
            .map_err(|e| fail(format!("vertex buffer: {e}")))?;
        colors
            .try_reserve_exact(vertex_count)
            .map_err(|e| fail(format!("color buffer: {e}")))?;
        indices
            .try_reserve_exact(index_count)
            .map_err(|e| fail(format!("index buffer: {e}")))?;

        let anchor = coord.origin(size);
        let spacing = size / subdivisions as f32;
        let step = f64::from(size) / f64::from(subdivisions);
        let base_x = f64::from(coord.x) * f64::from(size);
        let base_z = f64::from(coord.z) * f64::from(size);

        for j in 0..resolution {
            for i in 0..resolution {
                let world_x = base_x + f64::from(i) * step;
                let world_z = base_z + f64::from(j) * step;
                let (height, color) = vertex(world_x, world_z);
                positions.push(Vec3::new(i as f32 * spacing, height, j as f32 * spacing));
                colors.push(color);
            }
        }

        for j in 0..subdivisions {
            for i in 0..subdivisions {
                let a = j * resolution + i;
                let b = (j + 1) * resolution + i;
                let c = b + 1;
                let d = a + 1;
                // Counter-clockwise seen from above
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Ok(Self {
            coord,
            anchor,
            size,
            mesh: TerrainMesh {
                resolution,
                spacing,
                positions,
                colors,
                indices,
            },
            material: TERRAIN_MATERIAL,
        })
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Returns the mesh.
    #[must_use]
    pub const fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// Returns the material.
    #[must_use]
    pub const fn material(&self) -> &Material {
        &self.material
    }

    /// Whether the closed square footprint contains `(x, z)`.
    ///
    /// Points on a shared edge are covered by both neighbors.
    #[must_use]
    pub fn covers(&self, x: f32, z: f32) -> bool {
        x >= self.anchor.x
            && x <= self.anchor.x + self.size
            && z >= self.anchor.z
            && z <= self.anchor.z + self.size
    }

    /// Highest elevation among vertices whose world X and Z are each within
    /// `tolerance` of `(x, z)`, or `None` if no vertex is that close.
    ///
    /// Only the grid columns and rows that can match are visited.
    #[must_use]
    pub fn max_elevation_near(&self, x: f32, z: f32, tolerance: f32) -> Option<f32> {
        let (i_lo, i_hi) = self.candidate_span(x - self.anchor.x, tolerance);
        let (j_lo, j_hi) = self.candidate_span(z - self.anchor.z, tolerance);

        let mut best: Option<f32> = None;
        for j in j_lo..=j_hi {
            for i in i_lo..=i_hi {
                let Some(local) = self.mesh.vertex(i, j) else {
                    continue;
                };
                let vx = local.x + self.anchor.x;
                let vz = local.z + self.anchor.z;
                if (vx - x).abs() < tolerance && (vz - z).abs() < tolerance {
                    best = Some(best.map_or(local.y, |h| h.max(local.y)));
                }
            }
        }
        best
    }

    /// Grid indices that could lie within `tolerance` of local offset `local`,
    /// padded by one on each side and clamped to the grid.
    fn candidate_span(&self, local: f32, tolerance: f32) -> (u32, u32) {
        let last = self.mesh.resolution - 1;
        let spacing = self.mesh.spacing;
        let lo = ((local - tolerance) / spacing).floor() - 1.0;
        let hi = ((local + tolerance) / spacing).ceil() + 1.0;
        let clamp = |v: f32| v.clamp(0.0, last as f32) as u32;
        (clamp(lo), clamp(hi))
    }
}

impl Segment for TerrainChunk {
    fn anchor(&self) -> Vec3 {
        self.anchor
    }

    fn renderable(&self) -> Renderable<'_> {
        Renderable::Terrain {
            anchor: self.anchor,
            mesh: &self.mesh,
            material: &self.material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sloped(coord: ChunkCoord) -> TerrainChunk {
        // Elevation equals world X, color encodes world Z
        TerrainChunk::build_with(coord, 100.0, 4, |wx, wz| {
            (wx as f32, [0.0, 0.0, wz as f32])
        })
        .expect("build failed")
    }

    #[test]
    fn test_grid_layout() {
        let chunk = sloped(ChunkCoord::new(1, -1));
        let mesh = chunk.mesh();
        assert_eq!(mesh.resolution(), 5);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.indices().len(), 4 * 4 * 6);
        assert_eq!(mesh.spacing(), 25.0);
        assert_eq!(chunk.anchor(), Vec3::new(100.0, 0.0, -100.0));

        let corner = mesh.vertex(4, 4).expect("corner vertex");
        assert_eq!(corner, Vec3::new(100.0, 200.0, 100.0));
        assert_eq!(mesh.colors()[24], [0.0, 0.0, 0.0]);
        assert!(mesh.vertex(5, 0).is_none());
    }

    #[test]
    fn test_indices_in_bounds() {
        let chunk = sloped(ChunkCoord::new(0, 0));
        let count = chunk.mesh().vertex_count() as u32;
        assert!(chunk.mesh().indices().iter().all(|&i| i < count));
    }

    #[test]
    fn test_covers_closed_footprint() {
        let chunk = sloped(ChunkCoord::new(0, 0));
        assert!(chunk.covers(0.0, 0.0));
        assert!(chunk.covers(100.0, 100.0));
        assert!(chunk.covers(50.0, 99.9));
        assert!(!chunk.covers(-0.01, 50.0));
        assert!(!chunk.covers(50.0, 100.01));
    }

    #[test]
    fn test_max_elevation_near_vertex() {
        let chunk = sloped(ChunkCoord::new(0, 0));
        // Vertex at world x = 25 has elevation 25
        assert_eq!(chunk.max_elevation_near(25.4, 50.0, 1.0), Some(25.0));
        // Between vertices: nothing within tolerance
        assert_eq!(chunk.max_elevation_near(12.5, 50.0, 1.0), None);
        // Tolerance is strict
        assert_eq!(chunk.max_elevation_near(26.0, 50.0, 1.0), None);
    }

    #[test]
    fn test_oversized_grid_fails_construction() {
        let result = TerrainChunk::build_with(ChunkCoord::new(3, 4), 100.0, 70_000, |_, _| {
            (0.0, [0.0; 3])
        });
        assert!(matches!(
            result,
            Err(WorldError::ConstructionFailed { x: 3, z: 4, .. })
        ));
    }
}
