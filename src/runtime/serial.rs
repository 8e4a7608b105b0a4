//! Compile-time simple scheduler for deterministic serial tests.
//!
//! Units run inline, in launch order, on the calling thread; the handle is
//! already satisfied when `launch` returns.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::placement::policy::PlacementPolicy;
use crate::runtime::{
    ClusterAllocation, PlacementRecord, Rank, Scheduler, TaskContext, UnitOfWork, Wait,
    checked_place,
};
use crate::vis_error::VisError;

/// Already-completed handle.
#[derive(Debug)]
pub struct Ready<T>(Result<T, VisError>);

impl<T> Wait for Ready<T> {
    type Output = T;
    fn wait(self) -> Result<T, VisError> {
        self.0
    }
}

#[derive(Debug)]
pub struct SerialScheduler<P> {
    total_ranks: usize,
    policy: Arc<P>,
    placements: Mutex<Vec<PlacementRecord>>,
}

impl<P: PlacementPolicy> SerialScheduler<P> {
    pub fn new(total_ranks: usize, policy: Arc<P>) -> Self {
        SerialScheduler {
            total_ranks,
            policy,
            placements: Mutex::new(Vec::new()),
        }
    }

    pub fn policy(&self) -> &Arc<P> {
        &self.policy
    }

    pub fn placements(&self) -> Vec<PlacementRecord> {
        self.placements.lock().clone()
    }
}

impl<P> ClusterAllocation for SerialScheduler<P> {
    fn total_ranks(&self) -> usize {
        self.total_ranks
    }
}

impl<P: PlacementPolicy> Scheduler for SerialScheduler<P> {
    type Handle<T: Send + 'static> = Ready<T>;

    fn place(&self, work: &UnitOfWork) -> Result<Rank, VisError> {
        checked_place(self.policy.as_ref(), self.total_ranks, work)
    }

    fn launch<T, F>(&self, work: UnitOfWork, body: F) -> Result<Ready<T>, VisError>
    where
        T: Send + 'static,
        F: FnOnce(&TaskContext) -> Result<T, VisError> + Send + 'static,
    {
        let rank = self.place(&work)?;
        self.placements.lock().push(PlacementRecord::of(&work, rank));
        Ok(Ready(body(&TaskContext { rank, work })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::policy::DefaultPlacement;
    use crate::placement::sample::SampleId;
    use crate::runtime::WorkKind;

    #[test]
    fn out_of_range_placement_is_refused() {
        // Origin rank 5 does not exist in a 2-rank allocation.
        let s = SerialScheduler::new(2, Arc::new(DefaultPlacement::new(2)));
        let work = UnitOfWork::new(WorkKind::SaveImage, SampleId(0), 5);
        let err = s.launch(work, |_| Ok(())).unwrap_err();
        assert_eq!(err, VisError::RankOutOfRange { rank: 5, total: 2 });
        assert!(s.placements().is_empty());
    }
}
