//! Interface to the rasterizer that paints one tile's data into pixels.

use crate::data::fluid::FluidSlice;
use crate::data::particles::ParticleSlice;
use crate::placement::tiling::TileCoord;
use crate::render::args::RenderArguments;
use crate::vis_error::VisError;

/// Everything a rasterizer may read for one tile.
#[derive(Clone, Copy, Debug)]
pub struct RasterRequest<'a> {
    pub tile: TileCoord,
    pub args: &'a RenderArguments,
    pub fluid: &'a FluidSlice,
    pub particles: &'a ParticleSlice,
}

/// Flat RGBA8 (`4 * width * height` bytes) and depth (`width * height`)
/// buffers, pixel `x + y * width`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterOutput {
    pub rgba: Vec<u8>,
    pub depth: Vec<f32>,
}

/// Renders one tile. Failing to acquire a drawing context is reported as
/// [`VisError::RenderContext`] and is fatal for the unit of work.
pub trait Rasterizer: Send + Sync + 'static {
    fn render(&self, request: &RasterRequest<'_>) -> Result<RasterOutput, VisError>;
}

impl<F> Rasterizer for F
where
    F: Fn(&RasterRequest<'_>) -> Result<RasterOutput, VisError> + Send + Sync + 'static,
{
    fn render(&self, request: &RasterRequest<'_>) -> Result<RasterOutput, VisError> {
        self(request)
    }
}
