//! Intra-process backend: every unit of work runs on its own OS thread.
//!
//! Each rank of the allocation is simulated inside one process. Units are
//! not pinned to a real processor; the rank is only recorded (thread name
//! and placement log) so routing decisions can be observed.

use std::any::Any;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::placement::policy::PlacementPolicy;
use crate::runtime::{
    ClusterAllocation, PlacementRecord, Rank, Scheduler, TaskContext, UnitOfWork, Wait,
    checked_place,
};
use crate::vis_error::VisError;

/// Completion handle for a unit running on a worker thread.
pub struct ThreadHandle<T> {
    rank: Rank,
    join: JoinHandle<Result<T, VisError>>,
}

impl<T> Wait for ThreadHandle<T> {
    type Output = T;

    fn wait(self) -> Result<T, VisError> {
        let rank = self.rank;
        self.join.join().map_err(|panic| VisError::TaskFailed {
            rank,
            reason: panic_reason(panic.as_ref()),
        })?
    }
}

pub(crate) fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}

#[derive(Debug)]
pub struct ThreadScheduler<P> {
    total_ranks: usize,
    policy: Arc<P>,
    placements: Arc<Mutex<Vec<PlacementRecord>>>,
}

impl<P: PlacementPolicy> ThreadScheduler<P> {
    pub fn new(total_ranks: usize, policy: Arc<P>) -> Self {
        ThreadScheduler {
            total_ranks,
            policy,
            placements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn policy(&self) -> &Arc<P> {
        &self.policy
    }

    /// Every placement decision made so far, in launch order.
    pub fn placements(&self) -> Vec<PlacementRecord> {
        self.placements.lock().clone()
    }
}

impl<P> ClusterAllocation for ThreadScheduler<P> {
    fn total_ranks(&self) -> usize {
        self.total_ranks
    }
}

impl<P: PlacementPolicy> Scheduler for ThreadScheduler<P> {
    type Handle<T: Send + 'static> = ThreadHandle<T>;

    fn place(&self, work: &UnitOfWork) -> Result<Rank, VisError> {
        checked_place(self.policy.as_ref(), self.total_ranks, work)
    }

    fn launch<T, F>(&self, work: UnitOfWork, body: F) -> Result<ThreadHandle<T>, VisError>
    where
        T: Send + 'static,
        F: FnOnce(&TaskContext) -> Result<T, VisError> + Send + 'static,
    {
        let rank = self.place(&work)?;
        self.placements.lock().push(PlacementRecord::of(&work, rank));
        let ctx = TaskContext { rank, work };
        let join = std::thread::Builder::new()
            .name(format!("rank-{rank}"))
            .spawn(move || body(&ctx))
            .map_err(|e| VisError::TaskFailed {
                rank,
                reason: e.to_string(),
            })?;
        Ok(ThreadHandle { rank, join })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::policy::DefaultPlacement;
    use crate::placement::sample::SampleId;
    use crate::placement::tiling::Tiling;
    use crate::runtime::WorkKind;

    fn scheduler(ranks: usize) -> ThreadScheduler<DefaultPlacement> {
        ThreadScheduler::new(ranks, Arc::new(DefaultPlacement::new(ranks)))
    }

    #[test]
    fn launch_runs_on_named_rank_thread() {
        let s = scheduler(4);
        let work = UnitOfWork::new(WorkKind::SaveImage, SampleId(0), 2);
        let h = s
            .launch(work, |ctx| {
                Ok((ctx.rank, std::thread::current().name().map(str::to_owned)))
            })
            .unwrap();
        let (rank, name) = h.wait().unwrap();
        assert_eq!(rank, 2);
        assert_eq!(name.as_deref(), Some("rank-2"));
    }

    #[test]
    fn panics_surface_as_task_failures() {
        let s = scheduler(1);
        let work = UnitOfWork::new(WorkKind::SaveImage, SampleId(0), 0);
        let h = s.launch::<(), _>(work, |_| panic!("boom")).unwrap();
        match h.wait() {
            Err(VisError::TaskFailed { rank, reason }) => {
                assert_eq!(rank, 0);
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn index_launch_records_one_placement_per_tile() {
        let s = scheduler(8);
        let domain = Tiling::new(2, 2, 2).unwrap();
        let template = UnitOfWork::new(WorkKind::TileRender, SampleId(0), 0);
        let set = s
            .index_launch(template, &domain, |ctx| Ok(ctx.tile()?.index))
            .unwrap();
        let mut got = set.wait_all().unwrap();
        got.sort_unstable();
        assert_eq!(got, (0..8).collect::<Vec<_>>());
        assert_eq!(s.placements().len(), 8);
    }
}
