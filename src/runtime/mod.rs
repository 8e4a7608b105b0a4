//! Thin façade over the task runtime that executes units of work.
//!
//! The rest of the crate only talks to a [`Scheduler`]: it asks for a
//! placement, launches a unit (or one unit per tile of a domain) and blocks
//! on the returned completion handles. Two in-process backends are provided:
//! [`ThreadScheduler`] (one OS thread per unit, named after its rank) and
//! [`SerialScheduler`] (inline execution for deterministic tests).
//! With `mpi-support`, [`MpiAllocation`] reports the real cluster size.

pub mod serial;
pub mod thread;
pub mod unit;
#[cfg(feature = "mpi-support")]
pub mod mpi_allocation;

use std::sync::Arc;

use crate::placement::policy::PlacementPolicy;
use crate::placement::tiling::Tiling;
use crate::vis_error::VisError;

pub use serial::SerialScheduler;
pub use thread::ThreadScheduler;
pub use unit::{PlacementRecord, TaskContext, TilePoint, UnitOfWork, WorkKind};
#[cfg(feature = "mpi-support")]
pub use mpi_allocation::MpiAllocation;

/// Index of one worker process in the allocation.
pub type Rank = usize;

/// The set of ranks actually available to this job.
pub trait ClusterAllocation {
    /// Number of ranks in the allocation.
    fn total_ranks(&self) -> usize;
    /// Rank of the calling process.
    fn local_rank(&self) -> Rank {
        0
    }
}

/// A fixed allocation of `n` ranks, seen from rank 0.
impl ClusterAllocation for usize {
    fn total_ranks(&self) -> usize {
        *self
    }
}

/// Anything that can be waited on.
pub trait Wait {
    type Output;
    /// Block until the unit of work finished and return its result.
    fn wait(self) -> Result<Self::Output, VisError>;
}

/// One completion handle per launched point, in launch order.
#[derive(Debug)]
pub struct CompletionSet<H> {
    handles: Vec<H>,
}

impl<H: Wait> CompletionSet<H> {
    pub fn new(handles: Vec<H>) -> Self {
        CompletionSet { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every handle. All handles are drained even after a failure
    /// so no unit is left running; the first error is returned.
    pub fn wait_all(self) -> Result<Vec<H::Output>, VisError> {
        let mut out = Vec::with_capacity(self.handles.len());
        let mut first_err = None;
        for h in self.handles {
            match h.wait() {
                Ok(v) => out.push(v),
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    /// Wait for every handle, then report `err`. Used when a launch fails
    /// partway so units already started cannot outlive the caller's
    /// barrier; their own results are dropped.
    pub fn settle_then<T>(self, err: VisError) -> Result<T, VisError> {
        if let Err(e) = self.wait_all() {
            log::debug!("discarding unit failure after launch error: {e}");
        }
        Err(err)
    }
}

/// Non-blocking launch interface.
pub trait Scheduler: ClusterAllocation + Send + Sync {
    /// Handle returned by [`Scheduler::launch`].
    type Handle<T: Send + 'static>: Wait<Output = T>;

    /// Rank on which `work` would run.
    fn place(&self, work: &UnitOfWork) -> Result<Rank, VisError>;

    /// Place `work` and start `body` on the selected rank.
    fn launch<T, F>(&self, work: UnitOfWork, body: F) -> Result<Self::Handle<T>, VisError>
    where
        T: Send + 'static,
        F: FnOnce(&TaskContext) -> Result<T, VisError> + Send + 'static;

    /// Launch `body` once per tile of `domain`; each unit is `template`
    /// specialised to its tile.
    fn index_launch<T, F>(
        &self,
        template: UnitOfWork,
        domain: &Tiling,
        body: F,
    ) -> Result<CompletionSet<Self::Handle<T>>, VisError>
    where
        T: Send + 'static,
        F: Fn(&TaskContext) -> Result<T, VisError> + Send + Sync + 'static,
    {
        let body = Arc::new(body);
        let mut handles = Vec::with_capacity(domain.tile_count());
        for (index, coord) in domain.tiles().enumerate() {
            let body = Arc::clone(&body);
            let work = template.at_tile(TilePoint { coord, index });
            match self.launch(work, move |ctx| body(ctx)) {
                Ok(h) => handles.push(h),
                Err(e) => return CompletionSet::new(handles).settle_then(e),
            }
        }
        Ok(CompletionSet::new(handles))
    }
}

/// Ask `policy` for a rank and check it against the allocation.
pub(crate) fn checked_place<P>(
    policy: &P,
    total_ranks: usize,
    work: &UnitOfWork,
) -> Result<Rank, VisError>
where
    P: PlacementPolicy + ?Sized,
{
    let rank = policy.select_initial_rank(work)?;
    if rank >= total_ranks {
        return Err(VisError::RankOutOfRange {
            rank,
            total: total_ranks,
        });
    }
    Ok(rank)
}
