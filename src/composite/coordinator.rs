//! Per-frame reduction and save.

use std::path::PathBuf;
use std::sync::Arc;

use crate::composite::compositor::ImageCompositor;
use crate::composite::depth::DepthTest;
use crate::persist::writer::ImageWriter;
use crate::placement::tiling::TileCoord;
use crate::runtime::{Rank, Scheduler, UnitOfWork, Wait, WorkKind};
use crate::vis_error::VisError;

/// Result of one reduce-and-save round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Saved { frame: u32, path: PathBuf },
    /// The composite was produced but its file could not be written. The
    /// frame number is still consumed.
    Lost { frame: u32, reason: VisError },
}

impl FrameOutcome {
    pub fn frame(&self) -> u32 {
        match self {
            FrameOutcome::Saved { frame, .. } | FrameOutcome::Lost { frame, .. } => *frame,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, FrameOutcome::Saved { .. })
    }
}

/// Drives the reduction of one sample's partial images and the save of the
/// composite.
pub struct CompositingCoordinator<'a, S> {
    scheduler: &'a S,
    writer: &'a Arc<ImageWriter>,
}

impl<'a, S: Scheduler> CompositingCoordinator<'a, S> {
    pub fn new(scheduler: &'a S, writer: &'a Arc<ImageWriter>) -> Self {
        CompositingCoordinator { scheduler, writer }
    }

    /// Reduce with [`DepthTest::Less`], wait, then launch exactly one save
    /// unit from `origin` and wait for it. A failed save is reported as
    /// [`FrameOutcome::Lost`]; failures of the reduction itself are errors.
    pub fn reduce_and_save(
        &self,
        compositor: &ImageCompositor,
        origin: Rank,
    ) -> Result<FrameOutcome, VisError> {
        compositor.set_depth_test(DepthTest::Less);
        compositor
            .reduce_associative_commutative(self.scheduler, origin)?
            .wait_all()?;

        let composite = compositor.image_partition().slice_at(TileCoord::ORIGIN)?.clone();
        let writer = Arc::clone(self.writer);
        let work = UnitOfWork::new(WorkKind::SaveImage, compositor.sample(), origin);
        let saved = self
            .scheduler
            .launch(work, move |_| Ok(writer.save(&composite.read())))?
            .wait()?;

        Ok(match saved {
            Ok(image) => FrameOutcome::Saved {
                frame: image.frame,
                path: image.path,
            },
            Err(failure) => {
                log::error!(
                    "Sample {}: frame {} lost: {}",
                    compositor.sample(),
                    failure.frame,
                    failure.error
                );
                FrameOutcome::Lost {
                    frame: failure.frame,
                    reason: failure.error,
                }
            }
        })
    }
}
