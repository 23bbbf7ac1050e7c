//! Keyed store of live world segments.

use ahash::AHashMap;
use flyby_common::ChunkCoord;
use glam::Vec3;
use tracing::trace;

use crate::render::{RenderSurface, Renderable, SegmentKind};

/// A loaded piece of world content anchored at a chunk.
pub trait Segment {
    /// World-space anchor used for eviction distance.
    fn anchor(&self) -> Vec3;

    /// Geometry handed to the render surface on creation.
    fn renderable(&self) -> Renderable<'_>;
}

/// Map from chunk coordinate to an owned segment.
///
/// All mutation happens on the tick thread; no locking is involved.
#[derive(Debug)]
pub struct SegmentRegistry<T> {
    /// Which kind of segment this registry holds
    kind: SegmentKind,
    /// Live segments
    entries: AHashMap<ChunkCoord, T>,
}

impl<T: Segment> SegmentRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(kind: SegmentKind) -> Self {
        Self {
            kind,
            entries: AHashMap::new(),
        }
    }

    /// Inserts `factory(coord)` unless `coord` is already present.
    ///
    /// Returns `Ok(true)` if a segment was created and `Ok(false)` if one was
    /// already there, in which case `factory` is not called. A factory error is
    /// returned as-is and leaves the registry unchanged.
    pub fn ensure<F, E>(&mut self, coord: ChunkCoord, factory: F) -> Result<bool, E>
    where
        F: FnOnce(ChunkCoord) -> Result<T, E>,
    {
        use std::collections::hash_map::Entry;

        match self.entries.entry(coord) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(factory(coord)?);
                Ok(true)
            },
        }
    }

    /// Removes every segment whose anchor is strictly farther than
    /// `max_distance` from `origin`, then asks `surface` to dispose of it.
    ///
    /// Returns the number of segments evicted.
    pub fn evict_far(
        &mut self,
        origin: Vec3,
        max_distance: f32,
        surface: &mut dyn RenderSurface,
    ) -> usize {
        let far: Vec<ChunkCoord> = self
            .entries
            .iter()
            .filter(|(_, segment)| segment.anchor().distance(origin) > max_distance)
            .map(|(coord, _)| *coord)
            .collect();

        for coord in &far {
            // Unlinked before disposal, so no reader sees a half-released segment
            if let Some(segment) = self.entries.remove(coord) {
                surface.dispose(self.kind, *coord);
                drop(segment);
                trace!("evicted {} {coord}", self.kind.label());
            }
        }
        far.len()
    }

    /// Returns the segment at `coord`.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<&T> {
        self.entries.get(&coord)
    }

    /// Whether `coord` is loaded.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    /// Number of loaded segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kind of segment held.
    #[must_use]
    pub const fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Iterates loaded segments in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &T)> {
        self.entries.iter().map(|(coord, segment)| (*coord, segment))
    }

    /// Loaded coordinates, sorted.
    #[must_use]
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.entries.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Mutable access to every segment (ambient motion).
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CountingSurface, Material, NullSurface};
    use proptest::prelude::*;

    static MATERIAL: Material = Material::Toon {
        color: [0.0, 0.0, 0.0],
        opacity: 1.0,
    };

    #[derive(Debug, PartialEq)]
    struct Marker {
        anchor: Vec3,
    }

    impl Segment for Marker {
        fn anchor(&self) -> Vec3 {
            self.anchor
        }

        fn renderable(&self) -> Renderable<'_> {
            Renderable::Cluster {
                anchor: self.anchor,
                parts: &[],
                material: &MATERIAL,
            }
        }
    }

    fn marker_at(coord: ChunkCoord) -> Result<Marker, ()> {
        Ok(Marker {
            anchor: coord.origin(100.0),
        })
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut registry = SegmentRegistry::new(SegmentKind::Terrain);
        let mut calls = 0;
        let coord = ChunkCoord::new(2, -1);

        let created = registry.ensure(coord, |c| {
            calls += 1;
            marker_at(c)
        });
        assert_eq!(created, Ok(true));

        let created = registry.ensure(coord, |c| {
            calls += 1;
            marker_at(c)
        });
        assert_eq!(created, Ok(false));

        assert_eq!(calls, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(coord).map(Segment::anchor),
            Some(Vec3::new(200.0, 0.0, -100.0))
        );
    }

    #[test]
    fn test_failed_factory_leaves_map_untouched() {
        let mut registry: SegmentRegistry<Marker> = SegmentRegistry::new(SegmentKind::Cloud);
        let coord = ChunkCoord::new(0, 0);
        let result = registry.ensure(coord, |_| Err("exhausted"));
        assert_eq!(result, Err("exhausted"));
        assert!(registry.is_empty());
        assert!(!registry.contains(coord));

        // A later attempt succeeds
        assert_eq!(registry.ensure(coord, |c| marker_at(c).map_err(|()| "")), Ok(true));
    }

    #[test]
    fn test_evict_boundary_is_exclusive() {
        let mut registry = SegmentRegistry::new(SegmentKind::Terrain);
        for coord in [
            ChunkCoord::new(0, 0),
            ChunkCoord::new(3, 0),
            ChunkCoord::new(0, -3),
            ChunkCoord::new(4, 0),
        ] {
            assert_eq!(registry.ensure(coord, marker_at), Ok(true));
        }

        let mut surface = CountingSurface::new();
        let evicted = registry.evict_far(Vec3::ZERO, 300.0, &mut surface);

        assert_eq!(evicted, 1);
        assert_eq!(
            registry.coords(),
            vec![
                ChunkCoord::new(0, -3),
                ChunkCoord::new(0, 0),
                ChunkCoord::new(3, 0)
            ]
        );
        assert_eq!(surface.disposed(), 1);
    }

    #[test]
    fn test_evict_empty_registry() {
        let mut registry: SegmentRegistry<Marker> = SegmentRegistry::new(SegmentKind::Particle);
        assert_eq!(registry.evict_far(Vec3::ZERO, 10.0, &mut NullSurface), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_evict_disposes_with_registry_kind() {
        let mut registry = SegmentRegistry::new(SegmentKind::Cloud);
        let coord = ChunkCoord::new(10, 10);
        let mut surface = CountingSurface::new();
        registry.ensure(coord, marker_at).expect("ensure failed");
        if let Some(segment) = registry.get(coord) {
            surface.submit(SegmentKind::Cloud, coord, segment.renderable());
        }

        registry.evict_far(Vec3::ZERO, 100.0, &mut surface);
        assert!(!surface.is_live(SegmentKind::Cloud, coord));
        assert_eq!(surface.mismatches(), 0);
    }

    proptest! {
        #[test]
        fn prop_evict_keeps_exactly_the_near(
            coords in proptest::collection::hash_set((-8i32..8, -8i32..8), 0..40),
            radius in 0.0f32..900.0,
            ox in -400.0f32..400.0,
            oz in -400.0f32..400.0,
        ) {
            let mut registry = SegmentRegistry::new(SegmentKind::Terrain);
            for (x, z) in &coords {
                registry.ensure(ChunkCoord::new(*x, *z), marker_at).expect("ensure failed");
            }
            let origin = Vec3::new(ox, 0.0, oz);
            let evicted = registry.evict_far(origin, radius, &mut NullSurface);

            prop_assert_eq!(evicted + registry.len(), coords.len());
            for (x, z) in &coords {
                let coord = ChunkCoord::new(*x, *z);
                let near = coord.origin(100.0).distance(origin) <= radius;
                prop_assert_eq!(registry.contains(coord), near);
            }
        }
    }
}
