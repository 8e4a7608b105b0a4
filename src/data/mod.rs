//! Tile-partitioned datasets: fluid fields, particles and partial images.

pub mod fluid;
pub mod image;
pub mod partition;
pub mod particles;

pub use fluid::FluidSlice;
pub use image::{ImageChannel, ImageDescriptor, PartialImage};
pub use partition::{Partition, PartitionId, Privilege, RegionRef, RegionRequirement};
pub use particles::ParticleSlice;
