//! Samples: independent simulation runs sharing one allocation.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::placement::tiling::{TileCoord, Tiling};
use crate::runtime::Rank;
use crate::vis_error::VisError;

/// Identifier of one sample, as declared by its configuration.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SampleId(pub u32);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sample together with the contiguous rank range it was allocated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub id: SampleId,
    pub tiling: Tiling,
    pub first_rank: Rank,
}

impl Sample {
    /// `[first_rank, first_rank + tile_count)`.
    pub fn rank_range(&self) -> Range<Rank> {
        self.first_rank..self.first_rank + self.tiling.tile_count()
    }

    /// Rank owning `tile`: the sample's ranks are handed to tiles in
    /// row-major order.
    pub fn rank_of(&self, tile: TileCoord) -> Result<Rank, VisError> {
        Ok(self.first_rank + self.tiling.linear_index(tile)?)
    }
}
