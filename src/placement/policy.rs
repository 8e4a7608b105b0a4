//! Placement policies: which rank runs a unit of work, and which region
//! instance backs a region requirement.
//!
//! [`SamplePlacementPolicy`] hands every sample a disjoint, contiguous range
//! of ranks (one per tile) in declaration order, sends each sample's root
//! work to the first rank of its range, and defers every other decision to
//! a baseline policy ([`DefaultPlacement`] unless another is injected).

use hashbrown::HashMap;

use crate::config::{SampleConfig, scan_startup_args};
use crate::data::partition::{RegionRef, RegionRequirement};
use crate::placement::sample::{Sample, SampleId};
use crate::runtime::{ClusterAllocation, Rank, UnitOfWork, WorkKind};
use crate::vis_error::VisError;

/// Placement decisions consulted by a [`Scheduler`](crate::runtime::Scheduler).
pub trait PlacementPolicy: Send + Sync {
    /// Rank on which `work` starts.
    fn select_initial_rank(&self, work: &UnitOfWork) -> Result<Rank, VisError>;

    /// Region whose instance backs `req`. The stock behaviour reuses an
    /// instance of the whole enclosing partition.
    fn select_instance_region(&self, req: &RegionRequirement) -> RegionRef {
        req.parent()
    }
}

/// Stock baseline policy.
///
/// Tile-carrying work is spread over the allocation starting at the issuing
/// rank (`(origin + tile index) mod total`); everything else stays on the
/// issuing rank.
#[derive(Clone, Debug)]
pub struct DefaultPlacement {
    total_ranks: usize,
}

impl DefaultPlacement {
    pub fn new(total_ranks: usize) -> Self {
        DefaultPlacement { total_ranks }
    }
}

impl PlacementPolicy for DefaultPlacement {
    fn select_initial_rank(&self, work: &UnitOfWork) -> Result<Rank, VisError> {
        if self.total_ranks == 0 {
            return Err(VisError::RankOutOfRange {
                rank: work.origin,
                total: 0,
            });
        }
        Ok(match work.tile {
            Some(tile) => (work.origin + tile.index) % self.total_ranks,
            None => work.origin,
        })
    }
}

/// Assign ranks to samples in order; returns the samples and the total
/// number of ranks they need.
pub fn allocate_ranks(configs: &[SampleConfig]) -> Result<(Vec<Sample>, usize), VisError> {
    let mut samples: Vec<Sample> = Vec::with_capacity(configs.len());
    let mut allocated: usize = 0;
    for cfg in configs {
        let id = cfg.sample_id();
        let tiling = cfg.tiling()?;
        if samples.iter().any(|s| s.id == id) {
            return Err(VisError::DuplicateSample(id));
        }
        samples.push(Sample {
            id,
            tiling,
            first_rank: allocated,
        });
        allocated = allocated
            .checked_add(tiling.tile_count())
            .ok_or(VisError::RankCountOverflow(id))?;
    }
    Ok((samples, allocated))
}

/// Maps every sample to a disjoint set of ranks, one rank per tile.
#[derive(Clone, Debug)]
pub struct SamplePlacementPolicy<B = DefaultPlacement> {
    samples: Vec<Sample>,
    by_id: HashMap<SampleId, usize>,
    allocated_ranks: usize,
    total_ranks: usize,
    baseline: B,
}

impl SamplePlacementPolicy<DefaultPlacement> {
    /// Allocate ranks for `configs` on an allocation of `total_ranks`.
    pub fn from_configs(configs: &[SampleConfig], total_ranks: usize) -> Result<Self, VisError> {
        Self::with_baseline(configs, total_ranks, DefaultPlacement::new(total_ranks))
    }

    /// Discover the sample configurations named by `-i`/`-I` flags and
    /// allocate ranks for them.
    pub fn from_startup_args<I, S, A>(args: I, allocation: &A) -> Result<Self, VisError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        A: ClusterAllocation + ?Sized,
    {
        let configs = scan_startup_args(args)?
            .iter()
            .map(|path| SampleConfig::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_configs(&configs, allocation.total_ranks())
    }

    /// Like [`Self::from_startup_args`], but any error is fatal: it is
    /// logged and the process exits with status 1 before any work runs.
    pub fn from_startup_args_or_exit<I, S, A>(args: I, allocation: &A) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        A: ClusterAllocation + ?Sized,
    {
        match Self::from_startup_args(args, allocation) {
            Ok(policy) => policy,
            Err(e) => {
                log::error!("{e}");
                eprintln!("insitu-viz: {e}");
                std::process::exit(1);
            }
        }
    }
}

impl<B: PlacementPolicy> SamplePlacementPolicy<B> {
    /// Allocate ranks for `configs`, deferring non-root work to `baseline`.
    pub fn with_baseline(
        configs: &[SampleConfig],
        total_ranks: usize,
        baseline: B,
    ) -> Result<Self, VisError> {
        let (samples, allocated_ranks) = allocate_ranks(configs)?;
        if allocated_ranks > total_ranks {
            return Err(VisError::RankCapacityExceeded {
                required: allocated_ranks,
                available: total_ranks,
            });
        }
        if allocated_ranks < total_ranks {
            log::warn!("{} rank(s) are unused", total_ranks - allocated_ranks);
        }
        let by_id = samples.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        Ok(SamplePlacementPolicy {
            samples,
            by_id,
            allocated_ranks,
            total_ranks,
            baseline,
        })
    }

    /// Samples in declaration order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample(&self, id: SampleId) -> Result<&Sample, VisError> {
        self.by_id
            .get(&id)
            .map(|&i| &self.samples[i])
            .ok_or(VisError::UnknownSample(id))
    }

    pub fn allocated_ranks(&self) -> usize {
        self.allocated_ranks
    }

    pub fn total_ranks(&self) -> usize {
        self.total_ranks
    }

    pub fn unused_ranks(&self) -> usize {
        self.total_ranks - self.allocated_ranks
    }

    pub fn baseline(&self) -> &B {
        &self.baseline
    }
}

impl<B: PlacementPolicy> PlacementPolicy for SamplePlacementPolicy<B> {
    fn select_initial_rank(&self, work: &UnitOfWork) -> Result<Rank, VisError> {
        match work.kind {
            // Send each root work unit to the first rank of its sample.
            WorkKind::SampleRoot => {
                let rank = self.sample(work.sample)?.first_rank;
                log::debug!(
                    "Sample {}: root work mapped to rank {rank}",
                    work.sample
                );
                Ok(rank)
            }
            _ => self.baseline.select_initial_rank(work),
        }
    }

    // Always bind the exact slice; never widen to an enclosing instance, so
    // each tile's image slice is its own buffer.
    fn select_instance_region(&self, req: &RegionRequirement) -> RegionRef {
        req.region
    }
}
