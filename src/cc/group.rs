//! Independent collectives running side by side in equal-size groups.

use rand::Rng;
use tracing::{debug, info};

use super::allreduce::{AllreduceAlgorithm, AllreduceParams, allreduce_on};
use super::alltoall::{AlltoallAlgorithm, AlltoallParams, alltoall_on};
use crate::error::ScheduleError;
use crate::graph::{CommGraph, Communicator, Partition, Schedule};

/// Split `num_groups * comm_size` ranks into consecutive blocks of
/// `comm_size`: color `rank / comm_size`, key `rank % comm_size`.
pub fn block_partition(num_groups: usize, comm_size: usize) -> Result<Partition, ScheduleError> {
    let total = num_groups.saturating_mul(comm_size);
    if total == 0 {
        return Err(ScheduleError::EmptyCommunicator);
    }
    let colors: Vec<usize> = (0..total).map(|rank| rank / comm_size).collect();
    let keys: Vec<usize> = (0..total).map(|rank| rank % comm_size).collect();
    Communicator::world(total).split(&colors, &keys)
}

/// Build one schedule of `num_groups * comm_size` ranks and run `build` once
/// per group, each time on that group's communicator.
pub fn for_each_group<F>(
    num_groups: usize,
    comm_size: usize,
    mut build: F,
) -> Result<Schedule, ScheduleError>
where
    F: FnMut(&mut CommGraph<'_>) -> Result<(), ScheduleError>,
{
    let partition = block_partition(num_groups, comm_size)?;
    let mut schedule = Schedule::new(partition.placement.len());
    for (group, comm) in partition.groups.iter().enumerate() {
        build(&mut CommGraph::new(&mut schedule, comm))?;
        debug!(group, size = comm.size(), "group collective built");
    }
    info!(
        groups = partition.groups.len(),
        ranks = schedule.num_ranks(),
        ops = schedule.num_ops(),
        "grouped schedule built"
    );
    Ok(schedule)
}

pub fn multi_allreduce(
    algorithm: AllreduceAlgorithm,
    num_comm_groups: usize,
    comm_size: usize,
    p: &AllreduceParams,
) -> Result<Schedule, ScheduleError> {
    for_each_group(num_comm_groups, comm_size, |g| allreduce_on(g, algorithm, p))
}

/// Under `Unbalanced` every group draws its own payload matrix from `rng`.
pub fn multi_alltoall<R: Rng + ?Sized>(
    algorithm: AlltoallAlgorithm,
    num_comm_groups: usize,
    comm_size: usize,
    p: &AlltoallParams,
    rng: &mut R,
) -> Result<Schedule, ScheduleError> {
    for_each_group(num_comm_groups, comm_size, |g| alltoall_on(g, algorithm, p, &mut *rng))
}
