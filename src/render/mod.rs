//! Tile rendering: argument payload, rasterizer interface and dispatch.

pub mod args;
pub mod dispatcher;
pub mod rasterizer;

pub use args::{IsosurfaceField, RenderArguments};
pub use dispatcher::{RenderInputs, TileRenderDispatcher};
pub use rasterizer::{RasterOutput, RasterRequest, Rasterizer};
