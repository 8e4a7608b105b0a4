//! The visualization pipeline as seen by the simulation.
//!
//! [`VisPipeline`] owns all cross-call state explicitly: the placement
//! policy, one compositor per sample, the routing registry and the image
//! writer with its process-wide frame counter. Per frame the simulation
//! calls [`VisPipeline::render`] then [`VisPipeline::reduce`] for each
//! sample, after a one-time [`VisPipeline::initialize`].

use std::sync::Arc;

use dashmap::DashMap;

use crate::composite::compositor::{ImageCompositor, ImageRegions};
use crate::composite::coordinator::{CompositingCoordinator, FrameOutcome};
use crate::config::VisConfig;
use crate::data::fluid::FluidSlice;
use crate::data::particles::ParticleSlice;
use crate::data::partition::Partition;
use crate::persist::debug_dump::DebugDump;
use crate::persist::writer::ImageWriter;
use crate::placement::policy::{DefaultPlacement, PlacementPolicy, SamplePlacementPolicy};
use crate::placement::sample::{Sample, SampleId};
use crate::render::args::RenderArguments;
use crate::render::dispatcher::{RenderInputs, TileRenderDispatcher};
use crate::render::rasterizer::Rasterizer;
use crate::routing::RoutingRegistry;
use crate::runtime::{Scheduler, TaskContext, UnitOfWork, WorkKind};
use crate::vis_error::VisError;

pub struct VisPipeline<S, R, B = DefaultPlacement> {
    config: VisConfig,
    scheduler: S,
    policy: Arc<SamplePlacementPolicy<B>>,
    rasterizer: Arc<R>,
    compositors: DashMap<SampleId, Arc<ImageCompositor>>,
    routing: RoutingRegistry,
    writer: Arc<ImageWriter>,
}

impl<S, R, B> VisPipeline<S, R, B>
where
    S: Scheduler,
    R: Rasterizer,
    B: PlacementPolicy + 'static,
{
    /// `scheduler` is expected to consult `policy` for its placements.
    pub fn new(
        config: VisConfig,
        policy: Arc<SamplePlacementPolicy<B>>,
        scheduler: S,
        rasterizer: Arc<R>,
    ) -> Self {
        let writer = Arc::new(ImageWriter::from_config(&config));
        log::info!(
            "visualization pipeline: {} sample(s) on {} rank(s), images to {}",
            policy.samples().len(),
            scheduler.total_ranks(),
            writer.dir().display()
        );
        VisPipeline {
            config,
            scheduler,
            policy,
            rasterizer,
            compositors: DashMap::new(),
            routing: RoutingRegistry::new(),
            writer,
        }
    }

    pub fn config(&self) -> &VisConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn policy(&self) -> &Arc<SamplePlacementPolicy<B>> {
        &self.policy
    }

    pub fn writer(&self) -> &Arc<ImageWriter> {
        &self.writer
    }

    pub fn routing(&self) -> &RoutingRegistry {
        &self.routing
    }

    /// Create (or return the existing) compositor of `sample`.
    pub fn initialize(&self, sample: SampleId) -> Result<ImageRegions, VisError> {
        let tiling = self.policy.sample(sample)?.tiling;
        let descriptor = self.config.image_descriptor();
        let entry = self.compositors.entry(sample).or_insert_with(|| {
            log::debug!("Sample {sample}: new compositor over {:?} tiles", tiling.extents());
            Arc::new(ImageCompositor::new(sample, tiling, descriptor))
        });
        Ok(entry.value().regions())
    }

    pub fn compositor(&self, sample: SampleId) -> Result<Arc<ImageCompositor>, VisError> {
        self.compositors
            .get(&sample)
            .map(|c| Arc::clone(c.value()))
            .ok_or(VisError::MissingCompositor(sample))
    }

    /// Render one frame of `sample` into its partial images.
    pub fn render(
        &self,
        sample: SampleId,
        fluid: &Partition<FluidSlice>,
        particles: &Partition<ParticleSlice>,
        args: &RenderArguments,
    ) -> Result<(), VisError> {
        let root = self.root(sample)?;
        let compositor = self.compositor(sample)?;
        TileRenderDispatcher::new(&self.scheduler, &self.policy, &self.routing, &self.rasterizer)
            .with_debug(DebugDump::from_config(&self.config))
            .dispatch(
                &compositor,
                RenderInputs {
                    fluid,
                    particles,
                    args,
                },
                root.first_rank,
            )
    }

    /// Composite the partial images of `sample` and save the frame.
    pub fn reduce(&self, sample: SampleId) -> Result<FrameOutcome, VisError> {
        let root = self.root(sample)?;
        let compositor = self.compositor(sample)?;
        CompositingCoordinator::new(&self.scheduler, &self.writer)
            .reduce_and_save(&compositor, root.first_rank)
    }

    /// Launch `body` as the root unit of `sample` and return its handle.
    pub fn run_sample<T, F>(&self, sample: SampleId, body: F) -> Result<S::Handle<T>, VisError>
    where
        T: Send + 'static,
        F: FnOnce(&TaskContext) -> Result<T, VisError> + Send + 'static,
    {
        let issuer = self.scheduler.local_rank();
        self.scheduler
            .launch(UnitOfWork::new(WorkKind::SampleRoot, sample, issuer), body)
    }

    fn root(&self, sample: SampleId) -> Result<Sample, VisError> {
        self.policy.sample(sample).copied()
    }
}
