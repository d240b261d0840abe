//! Peer-selection arithmetic shared by the collective builders.

use crate::error::ScheduleError;

/// Which way data flows along a binomial tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Children send towards rank 0.
    Reduce,
    /// Rank 0 sends towards the leaves.
    Broadcast,
}

impl Direction {
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        match raw.trim().to_lowercase().as_str() {
            "reduce" => Ok(Self::Reduce),
            "bcast" | "broadcast" => Ok(Self::Broadcast),
            _ => Err(ScheduleError::UnknownDirection(raw.to_string())),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `ceil(log2(ranks))`, zero for zero or one rank.
pub fn ceil_log2(ranks: usize) -> usize {
    ranks.next_power_of_two().trailing_zeros() as usize
}

/// Binomial tree neighbours of `rank` at `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStep {
    /// `rank + 2^step`, when that child exists at this step.
    pub child: Option<usize>,
    /// `rank - 2^step`, when `2^step <= rank < 2^(step+1)`.
    pub parent: Option<usize>,
}

pub fn binomial_step(rank: usize, ranks: usize, step: usize) -> TreeStep {
    let dist = 1usize << step;
    let child = (rank < dist && rank + dist < ranks).then_some(rank + dist);
    let parent = (rank >= dist && rank < dist << 1).then(|| rank - dist);
    TreeStep { child, parent }
}

/// Dissemination peers per step as `(send_to, recv_from)`, distance doubling
/// from 1 until it reaches `ranks`.
pub fn dissemination_peers(rank: usize, ranks: usize) -> Vec<(usize, usize)> {
    let mut peers = Vec::with_capacity(ceil_log2(ranks));
    let mut dist = 1;
    while dist < ranks {
        peers.push(((rank + dist) % ranks, (rank + ranks - dist) % ranks));
        dist <<= 1;
    }
    peers
}

/// Butterfly partners `rank ^ 2^i` for `i = 0..log2(ranks)`.
pub fn recdoub_peers(rank: usize, ranks: usize) -> Result<Vec<usize>, ScheduleError> {
    if !ranks.is_power_of_two() {
        return Err(ScheduleError::NotPowerOfTwo(ranks));
    }
    let steps = ranks.trailing_zeros() as usize;
    Ok((0..steps).map(|i| rank ^ (1 << i)).collect())
}

/// `(predecessor, successor)` on the ring.
pub fn ring_neighbours(rank: usize, ranks: usize) -> (usize, usize) {
    ((rank + ranks - 1) % ranks, (rank + 1) % ranks)
}

/// All-to-all partners for `step = 1..ranks`: `(sources, destinations)` with
/// sources `(rank - step) mod ranks` and destinations `(rank + step) mod ranks`.
pub fn alltoall_peers(rank: usize, ranks: usize) -> (Vec<usize>, Vec<usize>) {
    (1..ranks)
        .map(|step| ((rank + ranks - step) % ranks, (rank + step) % ranks))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_log2_small_values() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(5), 3);
        assert_eq!(ceil_log2(8), 3);
        assert_eq!(ceil_log2(9), 4);
    }

    #[test]
    fn direction_aliases() {
        assert_eq!(Direction::parse("reduce").unwrap(), Direction::Reduce);
        assert_eq!(Direction::parse(" BCAST ").unwrap(), Direction::Broadcast);
        assert_eq!(
            "broadcast".parse::<Direction>().unwrap(),
            Direction::Broadcast
        );
        assert!(Direction::parse("scatter").is_err());
    }
}
