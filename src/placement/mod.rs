//! Sample placement: tilings, samples and rank-assignment policies.

pub mod policy;
pub mod sample;
pub mod tiling;

pub use policy::{DefaultPlacement, PlacementPolicy, SamplePlacementPolicy, allocate_ranks};
pub use sample::{Sample, SampleId};
pub use tiling::{TileCoord, Tiling};
