//! Paired send/recv exchanges under different concurrency policies.
//!
//! Every helper issues, for each index `i`, one send to `destinations[i]` and
//! one receive from `sources[i]`, all under the same tag, and returns the
//! dependency handle of the last operation it created so the caller can chain
//! a following phase onto it.

use tracing::trace;

use crate::error::ScheduleError;
use crate::graph::{CommGraph, OpId};

/// Parallel peer and size lists for one rank. Ranks are local to the communicator.
#[derive(Debug, Clone, Copy)]
pub struct PairedExchange<'p> {
    pub rank: usize,
    pub sources: &'p [usize],
    pub destinations: &'p [usize],
    pub recv_sizes: &'p [u64],
    pub send_sizes: &'p [u64],
    pub tag: u32,
}

impl PairedExchange<'_> {
    /// Number of pairs, once all four lists agree on it and every rank is
    /// inside a communicator of `size` ranks.
    fn pairs(&self, size: usize) -> Result<usize, ScheduleError> {
        let expected = self.sources.len();
        for (what, got) in [
            ("destinations", self.destinations.len()),
            ("recv_sizes", self.recv_sizes.len()),
            ("send_sizes", self.send_sizes.len()),
        ] {
            if got != expected {
                return Err(ScheduleError::LengthMismatch {
                    what,
                    got,
                    expected,
                });
            }
        }
        let mut ranks = std::iter::once(&self.rank)
            .chain(self.sources)
            .chain(self.destinations);
        if let Some(&rank) = ranks.find(|&&rank| rank >= size) {
            return Err(ScheduleError::RankOutOfRange { rank, size });
        }
        Ok(expected)
    }

    fn issue(&self, g: &mut CommGraph<'_>, i: usize) -> (OpId, OpId) {
        let send = g.send(self.rank, self.destinations[i], self.send_sizes[i], self.tag);
        let recv = g.recv(self.sources[i], self.rank, self.recv_sizes[i], self.tag);
        trace!(
            rank = self.rank,
            step = i,
            dst = self.destinations[i],
            src = self.sources[i],
            tag = self.tag,
            "paired exchange"
        );
        (send, recv)
    }
}

/// One pair after another: both halves of step `i` wait for step `i - 1`'s
/// receive (or for `last_dependency` at step 0). With `compute_time > 0` a calc
/// op sits between each receive and the next step.
pub fn sequential_exchange(
    g: &mut CommGraph<'_>,
    ex: &PairedExchange<'_>,
    last_dependency: Option<OpId>,
    compute_time: u64,
) -> Result<Option<OpId>, ScheduleError> {
    let pairs = ex.pairs(g.size())?;
    let mut handle = last_dependency;
    for i in 0..pairs {
        let (send, recv) = ex.issue(g, i);
        if let Some(dep) = handle {
            g.requires(send, dep)?;
            g.requires(recv, dep)?;
        }
        handle = if compute_time > 0 {
            let calc = g.calc(ex.rank, compute_time);
            g.requires(calc, recv)?;
            Some(calc)
        } else {
            Some(recv)
        };
    }
    Ok(handle)
}

/// All pairs at once, no edges.
pub fn parallel_exchange(
    g: &mut CommGraph<'_>,
    ex: &PairedExchange<'_>,
) -> Result<Option<OpId>, ScheduleError> {
    let pairs = ex.pairs(g.size())?;
    let mut last = None;
    for i in 0..pairs {
        let (_, recv) = ex.issue(g, i);
        last = Some(recv);
    }
    Ok(last)
}

/// At most `window` pairs outstanding: pair `i` waits for both halves of pair
/// `i - window`.
pub fn windowed_exchange(
    g: &mut CommGraph<'_>,
    ex: &PairedExchange<'_>,
    window: usize,
) -> Result<Option<OpId>, ScheduleError> {
    if window == 0 {
        return Err(ScheduleError::ZeroWindow);
    }
    let pairs = ex.pairs(g.size())?;
    let mut issued: Vec<(OpId, OpId)> = Vec::with_capacity(pairs);
    for i in 0..pairs {
        let (send, recv) = ex.issue(g, i);
        if i >= window {
            let (prev_send, prev_recv) = issued[i - window];
            for op in [send, recv] {
                g.requires(op, prev_send)?;
                g.requires(op, prev_recv)?;
            }
        }
        issued.push((send, recv));
    }
    Ok(issued.last().map(|&(_, recv)| recv))
}
