//! Typed descriptions of the units of work the pipeline launches.

use crate::placement::sample::SampleId;
use crate::placement::tiling::TileCoord;
use crate::runtime::Rank;
use crate::vis_error::VisError;

/// What a unit of work does. Placement decisions match on this tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorkKind {
    /// Top-level work of one sample; drives its frames.
    SampleRoot,
    /// Render one tile into its partial image slice.
    TileRender,
    /// Merge one partial image into another during compositing.
    CompositeMerge,
    /// Persist the composite image of one frame.
    SaveImage,
}

/// A tile coordinate together with its linear index in the launch domain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TilePoint {
    pub coord: TileCoord,
    pub index: usize,
}

/// A unit of work as seen by the placement policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnitOfWork {
    pub kind: WorkKind,
    pub sample: SampleId,
    /// Rank issuing the launch.
    pub origin: Rank,
    /// Set for units launched over a tile domain.
    pub tile: Option<TilePoint>,
}

impl UnitOfWork {
    pub fn new(kind: WorkKind, sample: SampleId, origin: Rank) -> Self {
        UnitOfWork {
            kind,
            sample,
            origin,
            tile: None,
        }
    }

    /// The same unit, bound to one tile.
    pub fn at_tile(self, tile: TilePoint) -> Self {
        UnitOfWork {
            tile: Some(tile),
            ..self
        }
    }
}

/// What a running unit knows about itself.
#[derive(Copy, Clone, Debug)]
pub struct TaskContext {
    pub rank: Rank,
    pub work: UnitOfWork,
}

impl TaskContext {
    /// Tile this unit was launched for.
    pub fn tile(&self) -> Result<TilePoint, VisError> {
        self.work.tile.ok_or_else(|| {
            VisError::Routing(format!(
                "{:?} unit for sample {} carries no tile",
                self.work.kind, self.work.sample
            ))
        })
    }
}

/// One placement decision, as recorded by the in-process schedulers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlacementRecord {
    pub kind: WorkKind,
    pub sample: SampleId,
    pub tile: Option<TileCoord>,
    pub rank: Rank,
}

impl PlacementRecord {
    pub(crate) fn of(work: &UnitOfWork, rank: Rank) -> Self {
        PlacementRecord {
            kind: work.kind,
            sample: work.sample,
            tile: work.tile.map(|t| t.coord),
            rank,
        }
    }
}
