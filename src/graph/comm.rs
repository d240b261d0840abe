//! Communicators and the local-rank view of a schedule.

use super::id::OpId;
use super::op::OpKind;
use super::schedule::Schedule;
use super::split::{Partition, split};
use crate::error::ScheduleError;

/// Ordered set of global ranks; position in `members` is the local rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Communicator {
    members: Vec<usize>,
}

impl Communicator {
    /// Communicator over global ranks `0..size`.
    pub fn world(size: usize) -> Self {
        Self {
            members: (0..size).collect(),
        }
    }

    pub fn from_members(members: Vec<usize>) -> Self {
        Self { members }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Global rank of `local`. Panics if `local` is out of range.
    pub fn global(&self, local: usize) -> usize {
        self.members[local]
    }

    pub fn local(&self, global: usize) -> Option<usize> {
        self.members.iter().position(|&m| m == global)
    }

    /// Partition this communicator; `colors` and `keys` are indexed by local rank.
    pub fn split(&self, colors: &[usize], keys: &[usize]) -> Result<Partition, ScheduleError> {
        if colors.len() != self.size() {
            return Err(ScheduleError::LengthMismatch {
                what: "colors",
                got: colors.len(),
                expected: self.size(),
            });
        }
        let mut partition = split(colors, keys)?;
        for group in &mut partition.groups {
            for member in &mut group.members {
                *member = self.members[*member];
            }
        }
        Ok(partition)
    }
}

/// Builder handle: a communicator bound to the schedule it writes into.
pub struct CommGraph<'a> {
    schedule: &'a mut Schedule,
    comm: &'a Communicator,
}

impl<'a> CommGraph<'a> {
    pub fn new(schedule: &'a mut Schedule, comm: &'a Communicator) -> Self {
        Self { schedule, comm }
    }

    pub fn size(&self) -> usize {
        self.comm.size()
    }

    pub fn comm(&self) -> &Communicator {
        self.comm
    }

    pub fn schedule(&self) -> &Schedule {
        self.schedule
    }

    /// Send owned by local rank `src`.
    pub fn send(&mut self, src: usize, dst: usize, size: u64, tag: u32) -> OpId {
        let owner = self.comm.global(src);
        let dst = self.comm.global(dst);
        self.schedule.push(owner, OpKind::Send { dst, size, tag })
    }

    /// Receive owned by local rank `dst`.
    pub fn recv(&mut self, src: usize, dst: usize, size: u64, tag: u32) -> OpId {
        let owner = self.comm.global(dst);
        let src = self.comm.global(src);
        self.schedule.push(owner, OpKind::Recv { src, size, tag })
    }

    pub fn calc(&mut self, rank: usize, cost: u64) -> OpId {
        let owner = self.comm.global(rank);
        self.schedule.push(owner, OpKind::Calc { cost })
    }

    pub fn requires(&mut self, op: OpId, dep: OpId) -> Result<(), ScheduleError> {
        self.schedule.requires(op, dep)
    }
}
