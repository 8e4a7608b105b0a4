#![cfg_attr(docsrs, feature(doc_cfg))]
//! # insitu-viz
//!
//! insitu-viz is the distributed control layer of an in-situ visualization
//! pipeline: a running simulation hands it tile-partitioned fluid and
//! particle data once per frame, and it renders every tile on the rank that
//! owns it, composites the partial images with a depth test and saves one
//! TGA image per sample and frame.
//!
//! ## Features
//! - Sample placement: each sample gets a disjoint, contiguous rank range
//!   with one rank per tile ([`placement::SamplePlacementPolicy`])
//! - Tile routing: one identity projection per dataset so a render unit
//!   always reads and writes the slices of its own tile ([`routing`])
//! - Per-tile render dispatch through an injected [`render::Rasterizer`]
//! - Order-independent depth compositing by pairwise tree reduction
//!   ([`composite`])
//! - Numbered TGA output in `$SCRATCH` or the working directory ([`persist`])
//! - Pluggable schedulers: in-process threads or inline serial execution,
//!   with an MPI-backed allocation behind `mpi-support`
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! insitu-viz = "0.1"
//! # Optional features:
//! # features = ["mpi-support","rayon"]
//! ```
//!
//! ## Determinism
//!
//! Composited pixels are chosen by a strict total order on
//! `(depth, tile index)`, so the saved image is identical whatever order
//! the merge units finish in.

pub mod composite;
pub mod config;
pub mod data;
pub mod persist;
pub mod pipeline;
pub mod placement;
pub mod render;
pub mod routing;
pub mod runtime;
pub mod vis_error;

pub use pipeline::VisPipeline;
pub use vis_error::VisError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::composite::{CompositingCoordinator, DepthTest, FrameOutcome, ImageCompositor};
    pub use crate::config::{SampleConfig, VisConfig};
    pub use crate::data::{FluidSlice, ImageDescriptor, PartialImage, ParticleSlice, Partition};
    pub use crate::persist::ImageWriter;
    pub use crate::pipeline::VisPipeline;
    pub use crate::placement::{
        DefaultPlacement, PlacementPolicy, SampleId, SamplePlacementPolicy, TileCoord, Tiling,
    };
    pub use crate::render::{
        IsosurfaceField, RasterOutput, RasterRequest, Rasterizer, RenderArguments,
        TileRenderDispatcher,
    };
    pub use crate::routing::{RoutingRegistry, RoutingSet};
    #[cfg(feature = "mpi-support")]
    pub use crate::runtime::MpiAllocation;
    pub use crate::runtime::{
        ClusterAllocation, Scheduler, SerialScheduler, ThreadScheduler, Wait, WorkKind,
    };
    pub use crate::vis_error::VisError;
}
