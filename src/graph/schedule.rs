//! Whole-job operation graph.

use super::id::OpId;
use super::op::{Op, OpKind};
use crate::error::ScheduleError;

/// Operation lists for every global rank, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    ranks: Vec<Vec<Op>>,
}

impl Schedule {
    pub fn new(num_ranks: usize) -> Self {
        Self {
            ranks: vec![Vec::new(); num_ranks],
        }
    }

    pub fn num_ranks(&self) -> usize {
        self.ranks.len()
    }

    /// Operations owned by `rank`. Panics if `rank` is out of range.
    pub fn ops(&self, rank: usize) -> &[Op] {
        &self.ranks[rank]
    }

    pub fn op(&self, id: OpId) -> Option<&Op> {
        self.ranks.get(id.rank).and_then(|ops| ops.get(id.index))
    }

    pub fn num_ops(&self) -> usize {
        self.ranks.iter().map(Vec::len).sum()
    }

    pub fn num_edges(&self) -> usize {
        self.ranks
            .iter()
            .flat_map(|ops| ops.iter())
            .map(|op| op.requires.len())
            .sum()
    }

    /// Iterate `(id, op)` over all ranks.
    pub fn iter(&self) -> impl Iterator<Item = (OpId, &Op)> {
        self.ranks.iter().enumerate().flat_map(|(rank, ops)| {
            ops.iter()
                .enumerate()
                .map(move |(index, op)| (OpId { rank, index }, op))
        })
    }

    /// Append an operation to `rank`'s list. Panics if `rank` is out of range.
    pub(crate) fn push(&mut self, rank: usize, kind: OpKind) -> OpId {
        let ops = &mut self.ranks[rank];
        ops.push(Op::new(kind));
        OpId {
            rank,
            index: ops.len() - 1,
        }
    }

    /// Register that `op` must wait for `dep`. Repeated edges are kept once.
    pub fn requires(&mut self, op: OpId, dep: OpId) -> Result<(), ScheduleError> {
        if self.op(dep).is_none() {
            return Err(ScheduleError::UnknownOp {
                rank: dep.rank,
                index: dep.index,
            });
        }
        let target = self
            .ranks
            .get_mut(op.rank)
            .and_then(|ops| ops.get_mut(op.index))
            .ok_or(ScheduleError::UnknownOp {
                rank: op.rank,
                index: op.index,
            })?;
        if !target.requires.contains(&dep) {
            target.requires.push(dep);
        }
        Ok(())
    }
}
