//! Cluster allocation discovered from the MPI world communicator.

use mpi::environment::Universe;
use mpi::traits::*;

use crate::runtime::{ClusterAllocation, Rank};
use crate::vis_error::VisError;

/// Rank and size of `MPI_COMM_WORLD`. Keeps MPI initialized while alive.
pub struct MpiAllocation {
    _universe: Universe,
    rank: Rank,
    size: usize,
}

impl MpiAllocation {
    /// Initialize MPI and read the world rank/size.
    pub fn initialize() -> Result<Self, VisError> {
        let universe = mpi::initialize()
            .ok_or_else(|| VisError::Runtime("MPI was already initialized".into()))?;
        let world = universe.world();
        let rank = world.rank() as Rank;
        let size = world.size() as usize;
        Ok(MpiAllocation {
            _universe: universe,
            rank,
            size,
        })
    }
}

impl ClusterAllocation for MpiAllocation {
    fn total_ranks(&self) -> usize {
        self.size
    }

    fn local_rank(&self) -> Rank {
        self.rank
    }
}
