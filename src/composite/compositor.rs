//! Per-sample image compositor.
//!
//! Owns the image partition (one [`PartialImage`] per tile of the sample's
//! domain) and reduces it into the slice of tile `(0,0,0)` with a pairwise
//! tree of merge units: at level `k` the slice at linear index `i` (a
//! multiple of `2^(k+1)`) absorbs the slice at `i + 2^k`. Merges of one
//! level touch disjoint slices and run concurrently; levels are separated
//! by a wait.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::composite::depth::DepthTest;
use crate::data::image::{ImageChannel, ImageDescriptor, PartialImage};
use crate::data::partition::{Partition, PartitionId, RegionRef};
use crate::placement::sample::SampleId;
use crate::placement::tiling::{TileCoord, Tiling};
use crate::runtime::{CompletionSet, Rank, Scheduler, TilePoint, UnitOfWork, WorkKind};
use crate::vis_error::VisError;

/// What `initialize` hands back to the simulation: where the image lives
/// and where the finished composite will be.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageRegions {
    pub domain: Tiling,
    pub image: PartitionId,
    pub composite: RegionRef,
    pub channels: [ImageChannel; 5],
}

#[derive(Debug)]
pub struct ImageCompositor {
    sample: SampleId,
    domain: Tiling,
    descriptor: ImageDescriptor,
    image: Partition<PartialImage>,
    depth_test: RwLock<DepthTest>,
    frames_rendered: AtomicU64,
}

impl ImageCompositor {
    /// One cleared partial image per tile of `domain`.
    pub fn new(sample: SampleId, domain: Tiling, descriptor: ImageDescriptor) -> Self {
        ImageCompositor {
            sample,
            domain,
            descriptor,
            image: Partition::from_fn(domain, |_| PartialImage::cleared(descriptor)),
            depth_test: RwLock::new(DepthTest::default()),
            frames_rendered: AtomicU64::new(0),
        }
    }

    pub fn sample(&self) -> SampleId {
        self.sample
    }

    /// The launch domain covering every tile of the sample.
    pub fn everywhere_domain(&self) -> &Tiling {
        &self.domain
    }

    pub fn image_descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    pub fn image_partition(&self) -> &Partition<PartialImage> {
        &self.image
    }

    /// Slice that holds the composite once a reduction has completed.
    pub fn composite_region(&self) -> RegionRef {
        RegionRef::slice(self.image.id(), TileCoord::ORIGIN)
    }

    pub fn regions(&self) -> ImageRegions {
        ImageRegions {
            domain: self.domain,
            image: self.image.id(),
            composite: self.composite_region(),
            channels: ImageChannel::ALL,
        }
    }

    pub fn depth_test(&self) -> DepthTest {
        *self.depth_test.read()
    }

    pub fn set_depth_test(&self, test: DepthTest) {
        *self.depth_test.write() = test;
    }

    /// Number the next render dispatch uses for its debug output.
    pub(crate) fn next_render_frame(&self) -> u64 {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed)
    }

    /// Launch the merge tree from `origin`. Every level but the last is
    /// waited on here; the returned set holds the last level's merges
    /// (empty for a single-tile domain).
    pub fn reduce_associative_commutative<S: Scheduler>(
        &self,
        scheduler: &S,
        origin: Rank,
    ) -> Result<CompletionSet<S::Handle<()>>, VisError> {
        let n = self.domain.tile_count();
        let test = self.depth_test();
        let mut level: Option<CompletionSet<S::Handle<()>>> = None;
        let mut stride = 1;
        while stride < n {
            if let Some(previous) = level.take() {
                previous.wait_all()?;
            }
            let mut handles = Vec::with_capacity(n / (2 * stride) + 1);
            if let Err(e) = self.launch_merge_level(scheduler, origin, stride, test, &mut handles) {
                return CompletionSet::new(handles).settle_then(e);
            }
            log::trace!(
                "Sample {}: merge level stride {stride}, {} merge(s)",
                self.sample,
                handles.len()
            );
            level = Some(CompletionSet::new(handles));
            stride *= 2;
        }
        Ok(level.unwrap_or_else(|| CompletionSet::new(Vec::new())))
    }

    /// Launch the merges of one tree level into `handles`; stops at the
    /// first failure, leaving the units already started in `handles`.
    fn launch_merge_level<S: Scheduler>(
        &self,
        scheduler: &S,
        origin: Rank,
        stride: usize,
        test: DepthTest,
        handles: &mut Vec<S::Handle<()>>,
    ) -> Result<(), VisError> {
        let n = self.domain.tile_count();
        for dst_index in (0..n).step_by(2 * stride) {
            let src_index = dst_index + stride;
            if src_index >= n {
                break;
            }
            let dst_coord = self.coord(dst_index)?;
            let dst = self.image.slice_at(dst_coord)?.clone();
            let src = self.image.slice_at(self.coord(src_index)?)?.clone();
            let work = UnitOfWork::new(WorkKind::CompositeMerge, self.sample, origin).at_tile(
                TilePoint {
                    coord: dst_coord,
                    index: dst_index,
                },
            );
            handles.push(scheduler.launch(work, move |_| {
                let src = src.read();
                test.merge_into(&mut dst.write(), &src)
            })?);
        }
        Ok(())
    }

    fn coord(&self, index: usize) -> Result<TileCoord, VisError> {
        self.domain.coord_of(index).ok_or_else(|| {
            VisError::Routing(format!("tile index {index} outside {:?}", self.domain))
        })
    }
}
