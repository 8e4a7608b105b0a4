//! Per-tile render dispatch.
//!
//! One render unit is launched per tile of the compositor's domain. Each
//! unit binds, through the sample's routing functions, the fluid and
//! particle slices of its tile read-only and the image slice of its tile
//! write-discard, runs the rasterizer, and stores the result into the image
//! slice. The dispatch returns only once every unit has finished.

use std::sync::Arc;

use bytes::Bytes;

use crate::composite::compositor::ImageCompositor;
use crate::data::fluid::FluidSlice;
use crate::data::image::PartialImage;
use crate::data::partition::{Partition, Privilege, RegionRef, RegionRequirement};
use crate::data::particles::ParticleSlice;
use crate::persist::debug_dump::DebugDump;
use crate::placement::policy::PlacementPolicy;
use crate::render::args::RenderArguments;
use crate::render::rasterizer::{RasterRequest, Rasterizer};
use crate::routing::{RoutingRegistry, RoutingSet};
use crate::runtime::{Rank, Scheduler, TaskContext, UnitOfWork, WorkKind};
use crate::vis_error::VisError;

/// Datasets and parameters of one render dispatch.
#[derive(Clone, Copy, Debug)]
pub struct RenderInputs<'a> {
    pub fluid: &'a Partition<FluidSlice>,
    pub particles: &'a Partition<ParticleSlice>,
    pub args: &'a RenderArguments,
}

pub struct TileRenderDispatcher<'a, S, P, R> {
    scheduler: &'a S,
    policy: &'a Arc<P>,
    routing: &'a RoutingRegistry,
    rasterizer: &'a Arc<R>,
    debug: Option<DebugDump>,
}

impl<'a, S, P, R> TileRenderDispatcher<'a, S, P, R>
where
    S: Scheduler,
    P: PlacementPolicy + 'static,
    R: Rasterizer,
{
    pub fn new(
        scheduler: &'a S,
        policy: &'a Arc<P>,
        routing: &'a RoutingRegistry,
        rasterizer: &'a Arc<R>,
    ) -> Self {
        TileRenderDispatcher {
            scheduler,
            policy,
            routing,
            rasterizer,
            debug: None,
        }
    }

    /// Enable the dumps `debug` describes.
    pub fn with_debug(mut self, debug: Option<DebugDump>) -> Self {
        self.debug = debug;
        self
    }

    /// Render every tile of `compositor`'s domain, launching from `origin`,
    /// and wait for all units.
    pub fn dispatch(
        &self,
        compositor: &ImageCompositor,
        inputs: RenderInputs<'_>,
        origin: Rank,
    ) -> Result<(), VisError> {
        let domain = *compositor.everywhere_domain();
        for (what, tiling) in [
            ("fluid", inputs.fluid.tiling()),
            ("particles", inputs.particles.tiling()),
        ] {
            if *tiling != domain {
                return Err(VisError::Routing(format!(
                    "{what} partition is tiled {:?}, sample {} is tiled {:?}",
                    tiling.extents(),
                    compositor.sample(),
                    domain.extents()
                )));
            }
        }
        if inputs.args.image != *compositor.image_descriptor() {
            return Err(VisError::BufferSizeMismatch {
                what: "render argument image",
                expected: compositor.image_descriptor().pixel_count(),
                actual: inputs.args.image.pixel_count(),
            });
        }

        let routing = self.routing.register_once(
            compositor.sample(),
            RoutingSet::new(
                domain,
                inputs.fluid.id(),
                inputs.particles.id(),
                compositor.image_partition().id(),
            ),
        )?;

        let unit = RenderUnit {
            routing,
            policy: Arc::clone(self.policy),
            fluid: inputs.fluid.clone(),
            particles: inputs.particles.clone(),
            image: compositor.image_partition().clone(),
            payload: inputs.args.encode()?,
            rasterizer: Arc::clone(self.rasterizer),
            debug: self.debug.clone(),
            frame: compositor.next_render_frame(),
        };
        let template = UnitOfWork::new(WorkKind::TileRender, compositor.sample(), origin);
        let done = self
            .scheduler
            .index_launch(template, &domain, move |ctx| unit.run(ctx))?
            .wait_all()?;
        log::debug!(
            "Sample {}: rendered {} tile(s)",
            compositor.sample(),
            done.len()
        );
        Ok(())
    }
}

/// Everything one render unit carries onto its rank.
struct RenderUnit<P, R> {
    routing: RoutingSet,
    policy: Arc<P>,
    fluid: Partition<FluidSlice>,
    particles: Partition<ParticleSlice>,
    image: Partition<PartialImage>,
    payload: Bytes,
    rasterizer: Arc<R>,
    debug: Option<DebugDump>,
    frame: u64,
}

impl<P: PlacementPolicy, R: Rasterizer> RenderUnit<P, R> {
    fn run(&self, ctx: &TaskContext) -> Result<(), VisError> {
        let tile = ctx.tile()?;
        let regions = self.routing.project(tile.coord)?;
        let fluid = self.fluid.bind(self.instance(regions.fluid, Privilege::ReadOnly)?)?;
        let particles = self
            .particles
            .bind(self.instance(regions.particles, Privilege::ReadOnly)?)?;
        let image = self
            .image
            .bind(self.instance(regions.image, Privilege::WriteDiscard)?)?;

        let args = RenderArguments::decode(&self.payload)?;
        let fluid = fluid.read();
        let particles = particles.read();
        fluid.validate()?;
        particles.validate()?;
        if let Some(debug) = &self.debug {
            debug.inputs(tile.coord, self.frame, &fluid, &particles);
        }

        let raster = self.rasterizer.render(&RasterRequest {
            tile: tile.coord,
            args: &args,
            fluid: &fluid,
            particles: &particles,
        })?;
        let tile_index = u32::try_from(tile.index)
            .map_err(|_| VisError::Routing(format!("tile index {} exceeds u32", tile.index)))?;
        let mut image = image.write();
        image.write_fragments(&raster.rgba, &raster.depth, tile_index)?;
        if let Some(debug) = &self.debug {
            debug.output(tile.coord, self.frame, &image);
        }
        log::trace!("tile {} rendered on rank {}", tile.coord, ctx.rank);
        Ok(())
    }

    /// Region the policy binds for `region`; anything but the exact slice
    /// would alias neighbouring tiles.
    fn instance(&self, region: RegionRef, privilege: Privilege) -> Result<RegionRef, VisError> {
        let chosen = self
            .policy
            .select_instance_region(&RegionRequirement::new(region, privilege));
        match (chosen == region, region.tile) {
            (true, _) => Ok(chosen),
            (false, Some(tile)) => Err(VisError::AliasedRegion(tile)),
            (false, None) => Err(VisError::Routing(format!(
                "region of {} has no tile",
                region.partition
            ))),
        }
    }
}
