//! Binomial tree and dissemination patterns.

use tracing::debug;

use super::build_on_world;
use super::topology::{Direction, TreeStep, binomial_step, ceil_log2, dissemination_peers};
use crate::error::ScheduleError;
use crate::graph::{CommGraph, OpId, Schedule};

/// Binomial tree rooted at local rank 0.
///
/// In [`Direction::Reduce`] every rank receives from its children and sends
/// once to its parent; the send waits for every child receive. In
/// [`Direction::Broadcast`] every rank receives once from its parent and each
/// send to a child waits for that receive.
#[tracing::instrument(skip(g), fields(ranks = g.size()))]
pub fn binomial_tree_on(
    g: &mut CommGraph<'_>,
    datasize: u64,
    tag: u32,
    direction: Direction,
) -> Result<(), ScheduleError> {
    let ranks = g.size();
    let steps = ceil_log2(ranks);
    for rank in 0..ranks {
        let mut send: Option<OpId> = None;
        let mut recv: Option<OpId> = None;
        for step in 0..steps {
            let TreeStep { child, parent } = binomial_step(rank, ranks, step);
            if let Some(child) = child {
                match direction {
                    Direction::Reduce => recv = Some(g.recv(child, rank, datasize, tag)),
                    Direction::Broadcast => send = Some(g.send(rank, child, datasize, tag)),
                }
                if let (Some(send), Some(recv)) = (send, recv) {
                    g.requires(send, recv)?;
                }
            }
            // The parent edge always comes at an earlier step than any child edge.
            if let Some(parent) = parent {
                match direction {
                    Direction::Reduce => send = Some(g.send(rank, parent, datasize, tag)),
                    Direction::Broadcast => recv = Some(g.recv(parent, rank, datasize, tag)),
                }
            }
        }
    }
    debug!(steps, "binomial tree built");
    Ok(())
}

pub fn binomial_tree(
    comm_size: usize,
    datasize: u64,
    tag: u32,
    direction: Direction,
) -> Result<Schedule, ScheduleError> {
    build_on_world(comm_size, |g| binomial_tree_on(g, datasize, tag, direction))
}

/// Dissemination barrier/exchange: at distance `d = 1, 2, 4, ...` each rank
/// sends to `rank + d` and receives from `rank - d`. Step `i`'s send waits for
/// step `i - 1`'s receive.
#[tracing::instrument(skip(g), fields(ranks = g.size()))]
pub fn dissemination_on(
    g: &mut CommGraph<'_>,
    datasize: u64,
    tag: u32,
) -> Result<(), ScheduleError> {
    let ranks = g.size();
    for rank in 0..ranks {
        let mut recv: Option<OpId> = None;
        for (send_to, recv_from) in dissemination_peers(rank, ranks) {
            let send = g.send(rank, send_to, datasize, tag);
            if let Some(prev) = recv {
                g.requires(send, prev)?;
            }
            recv = Some(g.recv(recv_from, rank, datasize, tag));
        }
    }
    debug!(steps = ceil_log2(ranks), "dissemination built");
    Ok(())
}

pub fn dissemination(comm_size: usize, datasize: u64, tag: u32) -> Result<Schedule, ScheduleError> {
    build_on_world(comm_size, |g| dissemination_on(g, datasize, tag))
}
