//! Procedural terrain generation.

use flyby_common::{ChunkCoord, WorldResult};
use noise::{NoiseFn, Perlin};

use crate::chunk::TerrainChunk;
use crate::config::WorldConfig;

/// Deterministic coherent 3D noise.
#[derive(Clone)]
pub struct NoiseField {
    /// Seed the permutation table was built from
    seed: u32,
    /// Improved Perlin noise
    perlin: Perlin,
    /// Spatial frequency applied before sampling
    scale: f64,
    /// Elevation amplitude
    height_scale: f32,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .field("scale", &self.scale)
            .field("height_scale", &self.height_scale)
            .finish()
    }
}

impl NoiseField {
    /// Creates a noise field.
    #[must_use]
    pub fn new(seed: u32, scale: f64, height_scale: f32) -> Self {
        Self {
            seed,
            perlin: Perlin::new(seed),
            scale,
            height_scale,
        }
    }

    /// Creates a noise field from world configuration.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.seed, config.noise_scale, config.height_scale)
    }

    /// Samples raw noise in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z]).clamp(-1.0, 1.0)
    }

    /// Terrain elevation at a world position.
    #[must_use]
    pub fn elevation(&self, world_x: f64, world_z: f64) -> f32 {
        let n = self.sample(world_x * self.scale, 0.0, world_z * self.scale);
        (n * f64::from(self.height_scale)) as f32
    }

    /// Elevation amplitude.
    #[must_use]
    pub const fn height_scale(&self) -> f32 {
        self.height_scale
    }

    /// Noise seed.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }
}

/// Builds terrain chunks from a [`NoiseField`].
///
/// Stateless apart from configuration: the same coordinate always yields
/// the same chunk, so evicted chunks can be rebuilt without seams.
#[derive(Debug, Clone)]
pub struct TerrainChunkFactory {
    /// Elevation source
    noise: NoiseField,
    /// Chunk side length
    segment_size: f32,
    /// Grid cells per side
    subdivisions: u32,
    /// Hue at the origin
    base_hue: f32,
    /// Hue change per world unit
    hue_drift: f32,
}

impl TerrainChunkFactory {
    /// Creates a factory from world configuration.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            noise: NoiseField::from_config(config),
            segment_size: config.segment_size,
            subdivisions: config.subdivisions,
            base_hue: config.base_hue,
            hue_drift: config.hue_drift,
        }
    }

    /// Synthesizes the chunk at `coord`.
    pub fn build(&self, coord: ChunkCoord) -> WorldResult<TerrainChunk> {
        TerrainChunk::build_with(coord, self.segment_size, self.subdivisions, |wx, wz| {
            let height = self.noise.elevation(wx, wz);
            (height, self.color_at(wx, wz, height))
        })
    }

    /// Vertex color: a hue that drifts slowly with world position, lightened
    /// slightly with height.
    ///
    /// Depends only on world position and elevation, so both chunks sharing
    /// an edge color it identically.
    #[must_use]
    pub fn color_at(&self, world_x: f64, world_z: f64, height: f32) -> [f32; 3] {
        let height_scale = self.noise.height_scale();
        let gradient = (height + height_scale) / (2.0 * height_scale);
        let hue = ((world_x + world_z) * f64::from(self.hue_drift) + f64::from(self.base_hue))
            .rem_euclid(1.0) as f32;
        hsl_to_rgb(hue, 1.0, 0.5 + 0.01 * gradient)
    }

    /// The noise field in use.
    #[must_use]
    pub const fn noise(&self) -> &NoiseField {
        &self.noise
    }
}

/// Converts HSL (all components in `[0, 1]`) to RGB.
#[must_use]
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(seed: u32) -> TerrainChunkFactory {
        TerrainChunkFactory::new(&WorldConfig {
            seed,
            ..Default::default()
        })
    }

    #[test]
    fn test_generation_deterministic() {
        let gen1 = factory(42);
        let gen2 = factory(42);

        let chunk1 = gen1.build(ChunkCoord::new(-3, 2)).expect("build failed");
        let chunk2 = gen2.build(ChunkCoord::new(-3, 2)).expect("build failed");

        assert_eq!(chunk1.mesh().positions(), chunk2.mesh().positions());
        assert_eq!(chunk1.mesh().colors(), chunk2.mesh().colors());
    }

    #[test]
    fn test_rebuild_after_drop_is_identical() {
        let generator = factory(7);
        let first = generator.build(ChunkCoord::new(1, 1)).expect("build failed");
        let snapshot = first.clone();
        drop(first);
        let again = generator.build(ChunkCoord::new(1, 1)).expect("build failed");
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_different_seeds_different_terrain() {
        let chunk1 = factory(42).build(ChunkCoord::new(0, 0)).expect("build failed");
        let chunk2 = factory(999).build(ChunkCoord::new(0, 0)).expect("build failed");
        assert_ne!(chunk1.mesh().positions(), chunk2.mesh().positions());
    }

    #[test]
    fn test_elevation_within_amplitude() {
        let generator = factory(3);
        let chunk = generator.build(ChunkCoord::new(5, -5)).expect("build failed");
        let amplitude = generator.noise().height_scale();
        assert!(chunk
            .mesh()
            .positions()
            .iter()
            .all(|p| p.y.abs() <= amplitude));
    }

    #[test]
    fn test_shared_edge_matches_neighbor() {
        let generator = factory(11);
        let west = generator.build(ChunkCoord::new(0, 0)).expect("build failed");
        let east = generator.build(ChunkCoord::new(1, 0)).expect("build failed");
        let last = west.mesh().resolution() - 1;

        for j in 0..=last {
            let w = (j * (last + 1) + last) as usize;
            let e = (j * (last + 1)) as usize;
            assert_eq!(west.mesh().positions()[w].y, east.mesh().positions()[e].y);
            assert_eq!(west.mesh().colors()[w], east.mesh().colors()[e]);
        }
    }

    #[test]
    fn test_hsl_primaries() {
        let close = |a: [f32; 3], b: [f32; 3]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5);
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgb(0.5, 0.0, 0.25), [0.25, 0.25, 0.25]));
        // Hue wraps
        assert!(close(hsl_to_rgb(1.25, 1.0, 0.5), hsl_to_rgb(0.25, 1.0, 0.5)));
    }
}
