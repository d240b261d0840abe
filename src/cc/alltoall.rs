//! All-to-all exchanges. The three variants share peer lists and differ only
//! in how many exchanges a rank keeps in flight and in payload sizing.

use rand::Rng;
use tracing::debug;

use super::build_on_world;
use super::collective::compact_name;
use super::topology::alltoall_peers;
use crate::error::ScheduleError;
use crate::graph::{CommGraph, Schedule};
use crate::pattern::{PairedExchange, parallel_exchange, windowed_exchange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlltoallAlgorithm {
    Windowed,
    Balanced,
    Unbalanced,
}

impl AlltoallAlgorithm {
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        match compact_name(raw).as_str() {
            "windowed" => Ok(Self::Windowed),
            "balanced" => Ok(Self::Balanced),
            "unbalanced" => Ok(Self::Unbalanced),
            _ => Err(ScheduleError::UnknownAlltoall(raw.to_string())),
        }
    }
}

impl std::str::FromStr for AlltoallAlgorithm {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlltoallParams {
    /// Bytes sent to each peer (the mean under `Unbalanced`).
    pub datasize: u64,
    pub tag: u32,
    /// Exchanges in flight per rank under `Windowed`.
    pub window_size: usize,
}

impl Default for AlltoallParams {
    fn default() -> Self {
        Self {
            datasize: 0,
            tag: 0,
            window_size: 1,
        }
    }
}

/// `sizes[src][dst]` is what `src` sends to `dst`: `datasize` plus a uniform
/// jitter of up to 10% either way, truncated towards zero.
pub fn payload_matrix<R: Rng + ?Sized>(ranks: usize, datasize: u64, rng: &mut R) -> Vec<Vec<u64>> {
    let span = i64::try_from(datasize).unwrap_or(i64::MAX);
    (0..ranks)
        .map(|_| {
            (0..ranks)
                .map(|_| {
                    let jitter = (0.1 * rng.random_range(-span..=span) as f64) as i64;
                    span.saturating_add(jitter).max(0) as u64
                })
                .collect()
        })
        .collect()
}

#[tracing::instrument(skip(g), fields(ranks = g.size()))]
pub fn windowed_alltoall_on(
    g: &mut CommGraph<'_>,
    p: &AlltoallParams,
) -> Result<(), ScheduleError> {
    if p.window_size == 0 {
        return Err(ScheduleError::ZeroWindow);
    }
    let ranks = g.size();
    let sizes = vec![p.datasize; ranks.saturating_sub(1)];
    for rank in 0..ranks {
        let (sources, destinations) = alltoall_peers(rank, ranks);
        let ex = PairedExchange {
            rank,
            sources: &sources,
            destinations: &destinations,
            recv_sizes: &sizes,
            send_sizes: &sizes,
            tag: p.tag,
        };
        windowed_exchange(g, &ex, p.window_size)?;
    }
    debug!(window = p.window_size, "windowed alltoall built");
    Ok(())
}

#[tracing::instrument(skip(g), fields(ranks = g.size()))]
pub fn balanced_alltoall_on(
    g: &mut CommGraph<'_>,
    p: &AlltoallParams,
) -> Result<(), ScheduleError> {
    let ranks = g.size();
    let sizes = vec![p.datasize; ranks.saturating_sub(1)];
    for rank in 0..ranks {
        let (sources, destinations) = alltoall_peers(rank, ranks);
        let ex = PairedExchange {
            rank,
            sources: &sources,
            destinations: &destinations,
            recv_sizes: &sizes,
            send_sizes: &sizes,
            tag: p.tag,
        };
        parallel_exchange(g, &ex)?;
    }
    Ok(())
}

/// Fully parallel exchange with per-pair sizes taken from `sizes`
/// (see [`payload_matrix`]), so both ends of a pair agree on the byte count.
#[tracing::instrument(skip(g, sizes), fields(ranks = g.size()))]
pub fn unbalanced_alltoall_on(
    g: &mut CommGraph<'_>,
    p: &AlltoallParams,
    sizes: &[Vec<u64>],
) -> Result<(), ScheduleError> {
    let ranks = g.size();
    if sizes.len() != ranks {
        return Err(ScheduleError::LengthMismatch {
            what: "payload matrix",
            got: sizes.len(),
            expected: ranks,
        });
    }
    if let Some(row) = sizes.iter().find(|row| row.len() != ranks) {
        return Err(ScheduleError::LengthMismatch {
            what: "payload matrix row",
            got: row.len(),
            expected: ranks,
        });
    }
    for rank in 0..ranks {
        let (sources, destinations) = alltoall_peers(rank, ranks);
        let recv_sizes: Vec<u64> = sources.iter().map(|&src| sizes[src][rank]).collect();
        let send_sizes: Vec<u64> = destinations.iter().map(|&dst| sizes[rank][dst]).collect();
        let ex = PairedExchange {
            rank,
            sources: &sources,
            destinations: &destinations,
            recv_sizes: &recv_sizes,
            send_sizes: &send_sizes,
            tag: p.tag,
        };
        parallel_exchange(g, &ex)?;
    }
    Ok(())
}

pub fn alltoall_on<R: Rng + ?Sized>(
    g: &mut CommGraph<'_>,
    algorithm: AlltoallAlgorithm,
    p: &AlltoallParams,
    rng: &mut R,
) -> Result<(), ScheduleError> {
    match algorithm {
        AlltoallAlgorithm::Windowed => windowed_alltoall_on(g, p),
        AlltoallAlgorithm::Balanced => balanced_alltoall_on(g, p),
        AlltoallAlgorithm::Unbalanced => {
            let sizes = payload_matrix(g.size(), p.datasize, rng);
            unbalanced_alltoall_on(g, p, &sizes)
        }
    }
}

pub fn alltoall<R: Rng + ?Sized>(
    algorithm: AlltoallAlgorithm,
    comm_size: usize,
    p: &AlltoallParams,
    rng: &mut R,
) -> Result<Schedule, ScheduleError> {
    build_on_world(comm_size, |g| alltoall_on(g, algorithm, p, rng))
}
