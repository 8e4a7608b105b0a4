//! Partition: a dataset divided into one slice per tile.
//!
//! A `Partition<T>` couples a [`Tiling`] with one independently lockable
//! slice per tile. Cloning a partition clones the handle, not the data, so
//! launched units can carry it into their closures. Slices of distinct
//! tiles never alias, which is what lets per-tile units run concurrently
//! without contention.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

use parking_lot::RwLock;

use crate::placement::tiling::{TileCoord, Tiling};
use crate::vis_error::VisError;

static NEXT_PARTITION: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(u64);

impl PartitionId {
    fn fresh() -> Self {
        PartitionId(NEXT_PARTITION.fetch_add(1, Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A region of a partition: one tile's slice, or the whole partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegionRef {
    pub partition: PartitionId,
    pub tile: Option<TileCoord>,
}

impl RegionRef {
    pub fn slice(partition: PartitionId, tile: TileCoord) -> Self {
        RegionRef {
            partition,
            tile: Some(tile),
        }
    }

    pub fn whole(partition: PartitionId) -> Self {
        RegionRef {
            partition,
            tile: None,
        }
    }
}

/// Access mode requested on a region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Privilege {
    ReadOnly,
    /// Every element is overwritten; previous contents are not read.
    WriteDiscard,
}

/// What a unit of work asks to have bound before it runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegionRequirement {
    pub region: RegionRef,
    pub privilege: Privilege,
}

impl RegionRequirement {
    pub fn new(region: RegionRef, privilege: Privilege) -> Self {
        RegionRequirement { region, privilege }
    }

    /// The enclosing region a widening policy could bind instead.
    pub fn parent(&self) -> RegionRef {
        RegionRef::whole(self.region.partition)
    }
}

/// Shared per-tile slice.
pub type Slice<T> = Arc<RwLock<T>>;

#[derive(Debug)]
pub struct Partition<T> {
    id: PartitionId,
    tiling: Tiling,
    slices: Arc<[Slice<T>]>,
}

impl<T> Clone for Partition<T> {
    fn clone(&self) -> Self {
        Partition {
            id: self.id,
            tiling: self.tiling,
            slices: Arc::clone(&self.slices),
        }
    }
}

impl<T> Partition<T> {
    /// Build one slice per tile, in linear-index order.
    pub fn from_fn<F>(tiling: Tiling, mut f: F) -> Self
    where
        F: FnMut(TileCoord) -> T,
    {
        let slices: Vec<Slice<T>> = tiling
            .tiles()
            .map(|tile| Arc::new(RwLock::new(f(tile))))
            .collect();
        Partition {
            id: PartitionId::fresh(),
            tiling,
            slices: slices.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> PartitionId {
        self.id
    }

    #[inline]
    pub fn tiling(&self) -> &Tiling {
        &self.tiling
    }

    /// Region naming the slice of `tile`.
    pub fn subregion(&self, tile: TileCoord) -> Result<RegionRef, VisError> {
        if !self.tiling.contains(tile) {
            return Err(self.tiling.out_of_range(tile));
        }
        Ok(RegionRef::slice(self.id, tile))
    }

    /// Slice of `tile`.
    pub fn slice_at(&self, tile: TileCoord) -> Result<&Slice<T>, VisError> {
        let i = self.tiling.linear_index(tile)?;
        Ok(&self.slices[i])
    }

    /// Bind `region` to its slice. Only exact single-tile regions of this
    /// partition can be bound.
    pub fn bind(&self, region: RegionRef) -> Result<Slice<T>, VisError> {
        if region.partition != self.id {
            return Err(VisError::Routing(format!(
                "region of {} bound against {}",
                region.partition, self.id
            )));
        }
        match region.tile {
            Some(tile) => self.slice_at(tile).cloned(),
            None => Err(VisError::Routing(format!(
                "whole-partition region {} cannot be bound to one slice",
                self.id
            ))),
        }
    }
}
