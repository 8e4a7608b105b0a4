//! `Tiling` and `TileCoord`: the 3D domain decomposition of one sample.
//!
//! A sample splits its physical domain into `nx × ny × nz` tiles. Each tile
//! is named by a [`TileCoord`] and, within its sample, by a row-major linear
//! index (z fastest), which is also the offset of its owning rank from the
//! sample's first rank.

use std::fmt;

use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::vis_error::VisError;

/// One cell of a sample's tiling.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl TileCoord {
    /// The composite image always lives in the slice of this tile.
    pub const ORIGIN: TileCoord = TileCoord { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        TileCoord { x, y, z }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Extents of a sample's tiling. All three counts are strictly positive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tiling {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl Tiling {
    /// Build a tiling; any zero extent, or a tile count that does not fit
    /// in `usize`, is rejected.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self, VisError> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(VisError::EmptyTiling { nx, ny, nz });
        }
        if nx.checked_mul(ny).and_then(|n| n.checked_mul(nz)).is_none() {
            return Err(VisError::TileCountOverflow { nx, ny, nz });
        }
        Ok(Tiling { nx, ny, nz })
    }

    #[inline]
    pub fn extents(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Number of tiles, and therefore of ranks, this tiling needs.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    #[inline]
    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.x < self.nx && tile.y < self.ny && tile.z < self.nz
    }

    /// Row-major linear index of `tile`, z varying fastest.
    pub fn linear_index(&self, tile: TileCoord) -> Result<usize, VisError> {
        if !self.contains(tile) {
            return Err(self.out_of_range(tile));
        }
        Ok(tile.z + self.nz * tile.y + self.nz * self.ny * tile.x)
    }

    /// Inverse of [`Tiling::linear_index`].
    pub fn coord_of(&self, index: usize) -> Option<TileCoord> {
        if index >= self.tile_count() {
            return None;
        }
        let z = index % self.nz;
        let y = (index / self.nz) % self.ny;
        let x = index / (self.nz * self.ny);
        Some(TileCoord { x, y, z })
    }

    /// Every tile coordinate, in linear-index order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + use<> {
        iproduct!(0..self.nx, 0..self.ny, 0..self.nz).map(|(x, y, z)| TileCoord { x, y, z })
    }

    pub(crate) fn out_of_range(&self, tile: TileCoord) -> VisError {
        VisError::TileOutOfRange {
            tile,
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
        }
    }
}
