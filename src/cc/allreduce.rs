//! Allreduce as reduce-scatter followed by allgather.

use tracing::debug;

use super::build_on_world;
use super::collective::compact_name;
use super::phase::PhaseSequencer;
use super::topology::{recdoub_peers, ring_neighbours};
use crate::error::ScheduleError;
use crate::graph::{CommGraph, Schedule};
use crate::pattern::{PairedExchange, sequential_exchange};

/// Payloads below this many bytes use recursive doubling under
/// [`AllreduceAlgorithm::DatasizeBased`].
pub const DATASIZE_THRESHOLD: u64 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllreduceAlgorithm {
    Ring,
    RecDoub,
    DatasizeBased,
}

impl AllreduceAlgorithm {
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        match compact_name(raw).as_str() {
            "ring" => Ok(Self::Ring),
            "recdoub" | "recursivedoubling" => Ok(Self::RecDoub),
            "datasizebased" => Ok(Self::DatasizeBased),
            _ => Err(ScheduleError::UnknownAllreduce(raw.to_string())),
        }
    }

    /// Concrete algorithm for a payload of `datasize` bytes.
    pub fn resolve(self, datasize: u64) -> Self {
        match self {
            Self::DatasizeBased if datasize < DATASIZE_THRESHOLD => Self::RecDoub,
            Self::DatasizeBased => Self::Ring,
            other => other,
        }
    }
}

impl std::str::FromStr for AllreduceAlgorithm {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllreduceParams {
    /// Bytes reduced by every rank.
    pub datasize: u64,
    /// Tag of the reduce-scatter phase; allgather uses `base_tag + 1`.
    pub base_tag: u32,
    /// Calc cost inserted after each receive; zero disables it.
    pub compute_time: u64,
}

impl AllreduceParams {
    /// Both phase tags must fit in `u32`.
    fn check_tags(&self) -> Result<(), ScheduleError> {
        self.base_tag
            .checked_add(1)
            .map(|_| ())
            .ok_or(ScheduleError::TagOverflow(self.base_tag))
    }
}

/// Per-step chunk of a ring allreduce: `ceil(datasize / ranks)`.
pub fn ring_chunk_bytes(datasize: u64, ranks: usize) -> u64 {
    let d = ranks.max(1) as u64;
    if d == 1 {
        return datasize;
    }
    datasize.div_ceil(d)
}

/// Butterfly allreduce. Needs a power-of-two communicator; any other size is
/// rejected before a single operation is created.
#[tracing::instrument(skip(g), fields(ranks = g.size()))]
pub fn recdoub_allreduce_on(
    g: &mut CommGraph<'_>,
    p: &AllreduceParams,
) -> Result<(), ScheduleError> {
    let ranks = g.size();
    if !ranks.is_power_of_two() {
        return Err(ScheduleError::NotPowerOfTwo(ranks));
    }
    p.check_tags()?;
    for rank in 0..ranks {
        let peers = recdoub_peers(rank, ranks)?;
        let sizes: Vec<u64> = (1..=peers.len()).map(|i| p.datasize >> i).collect();
        let peers_rev: Vec<usize> = peers.iter().rev().copied().collect();
        let sizes_rev: Vec<u64> = sizes.iter().rev().copied().collect();

        let mut seq = PhaseSequencer::new(p.base_tag);
        seq.phase("reduce_scatter", |tag, dep| {
            let ex = PairedExchange {
                rank,
                sources: &peers,
                destinations: &peers,
                recv_sizes: &sizes,
                send_sizes: &sizes,
                tag,
            };
            sequential_exchange(g, &ex, dep, p.compute_time)
        })?;
        seq.phase("allgather", |tag, dep| {
            let ex = PairedExchange {
                rank,
                sources: &peers_rev,
                destinations: &peers_rev,
                recv_sizes: &sizes_rev,
                send_sizes: &sizes_rev,
                tag,
            };
            sequential_exchange(g, &ex, dep, p.compute_time)
        })?;
    }
    debug!(steps = ranks.trailing_zeros(), "recursive doubling allreduce built");
    Ok(())
}

/// Ring allreduce: `ranks - 1` rounds forward, then `ranks - 1` rounds with
/// the roles of predecessor and successor swapped. Every round moves
/// [`ring_chunk_bytes`], even when `datasize` does not divide evenly.
#[tracing::instrument(skip(g), fields(ranks = g.size()))]
pub fn ring_allreduce_on(g: &mut CommGraph<'_>, p: &AllreduceParams) -> Result<(), ScheduleError> {
    p.check_tags()?;
    let ranks = g.size();
    let rounds = ranks.saturating_sub(1);
    let chunk = ring_chunk_bytes(p.datasize, ranks);
    let chunks = vec![chunk; rounds];
    for rank in 0..ranks {
        let (pred, succ) = ring_neighbours(rank, ranks);
        let preds = vec![pred; rounds];
        let succs = vec![succ; rounds];

        let mut seq = PhaseSequencer::new(p.base_tag);
        seq.phase("reduce_scatter", |tag, dep| {
            let ex = PairedExchange {
                rank,
                sources: &preds,
                destinations: &succs,
                recv_sizes: &chunks,
                send_sizes: &chunks,
                tag,
            };
            sequential_exchange(g, &ex, dep, p.compute_time)
        })?;
        seq.phase("allgather", |tag, dep| {
            let ex = PairedExchange {
                rank,
                sources: &succs,
                destinations: &preds,
                recv_sizes: &chunks,
                send_sizes: &chunks,
                tag,
            };
            sequential_exchange(g, &ex, dep, p.compute_time)
        })?;
    }
    debug!(rounds, chunk, "ring allreduce built");
    Ok(())
}

pub fn allreduce_on(
    g: &mut CommGraph<'_>,
    algorithm: AllreduceAlgorithm,
    p: &AllreduceParams,
) -> Result<(), ScheduleError> {
    match algorithm.resolve(p.datasize) {
        AllreduceAlgorithm::RecDoub => recdoub_allreduce_on(g, p),
        // `resolve` never yields `DatasizeBased`.
        AllreduceAlgorithm::Ring | AllreduceAlgorithm::DatasizeBased => ring_allreduce_on(g, p),
    }
}

pub fn allreduce(
    algorithm: AllreduceAlgorithm,
    comm_size: usize,
    p: &AllreduceParams,
) -> Result<Schedule, ScheduleError> {
    build_on_world(comm_size, |g| allreduce_on(g, algorithm, p))
}
