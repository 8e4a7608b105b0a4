//! Routing functions: tile coordinate → partition slice.
//!
//! A render unit touches three datasets (fluid, particles, image). Each is
//! reached through its own [`TileRouting`], but all three apply the same
//! identity projection over the sample's domain, so the slices a unit sees
//! always belong to the same tile whichever rank holds them.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use parking_lot::Mutex;

use crate::data::partition::{PartitionId, RegionRef};
use crate::placement::sample::SampleId;
use crate::placement::tiling::{TileCoord, Tiling};
use crate::vis_error::VisError;

/// Projection of a launch domain onto one partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileRouting {
    domain: Tiling,
    partition: PartitionId,
}

impl TileRouting {
    pub fn new(domain: Tiling, partition: PartitionId) -> Self {
        TileRouting { domain, partition }
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    /// Slice of the routed partition that belongs to `tile`.
    pub fn project(&self, tile: TileCoord) -> Result<RegionRef, VisError> {
        if !self.domain.contains(tile) {
            return Err(self.domain.out_of_range(tile));
        }
        Ok(RegionRef::slice(self.partition, tile))
    }
}

/// The three routing functions of one sample's render launch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoutingSet {
    pub fluid: TileRouting,
    pub particles: TileRouting,
    pub image: TileRouting,
}

/// Regions one tile's render unit binds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileRegions {
    pub fluid: RegionRef,
    pub particles: RegionRef,
    pub image: RegionRef,
}

impl RoutingSet {
    pub fn new(
        domain: Tiling,
        fluid: PartitionId,
        particles: PartitionId,
        image: PartitionId,
    ) -> Self {
        RoutingSet {
            fluid: TileRouting::new(domain, fluid),
            particles: TileRouting::new(domain, particles),
            image: TileRouting::new(domain, image),
        }
    }

    /// Route `tile` through all three functions.
    pub fn project(&self, tile: TileCoord) -> Result<TileRegions, VisError> {
        Ok(TileRegions {
            fluid: self.fluid.project(tile)?,
            particles: self.particles.project(tile)?,
            image: self.image.project(tile)?,
        })
    }
}

/// Per-sample routing functions, registered on first dispatch and reused.
#[derive(Debug, Default)]
pub struct RoutingRegistry {
    sets: Mutex<HashMap<SampleId, RoutingSet>>,
}

impl RoutingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `set` for `sample` unless one is already present. A second
    /// registration must name the same partitions.
    pub fn register_once(&self, sample: SampleId, set: RoutingSet) -> Result<RoutingSet, VisError> {
        match self.sets.lock().entry(sample) {
            Entry::Vacant(v) => {
                log::debug!("Sample {sample}: registering routing functions {set:?}");
                Ok(*v.insert(set))
            }
            Entry::Occupied(o) if *o.get() == set => Ok(set),
            Entry::Occupied(o) => Err(VisError::Routing(format!(
                "sample {sample} was registered with partitions ({}, {}, {}) \
                 but dispatched with ({}, {}, {})",
                o.get().fluid.partition(),
                o.get().particles.partition(),
                o.get().image.partition(),
                set.fluid.partition(),
                set.particles.partition(),
                set.image.partition(),
            ))),
        }
    }

    pub fn get(&self, sample: SampleId) -> Option<RoutingSet> {
        self.sets.lock().get(&sample).copied()
    }

    pub fn len(&self) -> usize {
        self.sets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::partition::Partition;

    fn ids(t: Tiling) -> (PartitionId, PartitionId, PartitionId) {
        (
            Partition::from_fn(t, |_| ()).id(),
            Partition::from_fn(t, |_| ()).id(),
            Partition::from_fn(t, |_| ()).id(),
        )
    }

    #[test]
    fn all_three_datasets_route_to_the_same_tile() {
        let t = Tiling::new(2, 3, 1).unwrap();
        let (f, p, i) = ids(t);
        let set = RoutingSet::new(t, f, p, i);
        for tile in t.tiles() {
            let r = set.project(tile).unwrap();
            assert_eq!(r.fluid, RegionRef::slice(f, tile));
            assert_eq!(r.particles, RegionRef::slice(p, tile));
            assert_eq!(r.image, RegionRef::slice(i, tile));
            assert_eq!(set.project(tile).unwrap(), r);
        }
        assert!(set.project(TileCoord::new(2, 0, 0)).is_err());
    }

    #[test]
    fn registry_reuses_and_guards_registrations() {
        let t = Tiling::new(1, 1, 1).unwrap();
        let (f, p, i) = ids(t);
        let reg = RoutingRegistry::new();
        let set = RoutingSet::new(t, f, p, i);
        assert_eq!(reg.register_once(SampleId(0), set).unwrap(), set);
        assert_eq!(reg.register_once(SampleId(0), set).unwrap(), set);
        assert_eq!(reg.len(), 1);

        let other = RoutingSet::new(t, p, f, i);
        assert!(reg.register_once(SampleId(0), other).is_err());
        assert_eq!(reg.register_once(SampleId(1), other).unwrap(), other);
        assert_eq!(reg.get(SampleId(0)), Some(set));
    }
}
