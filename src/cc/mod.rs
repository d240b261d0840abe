//! Collective communication algorithms, compiled into per-rank schedules.
//!
//! Each family exposes an `*_on` function that writes into an existing
//! [`CommGraph`] (so it can run inside a sub-group) and a convenience wrapper
//! that builds a fresh schedule over `comm_size` ranks.

pub mod allreduce;
pub mod alltoall;
pub mod collective;
pub mod group;
pub mod phase;
pub mod topology;
pub mod tree;

use crate::error::ScheduleError;
use crate::graph::{CommGraph, Communicator, Schedule};

/// Build a schedule over global ranks `0..comm_size`. Nothing is returned
/// unless `build` succeeds.
pub(crate) fn build_on_world<F>(comm_size: usize, build: F) -> Result<Schedule, ScheduleError>
where
    F: FnOnce(&mut CommGraph<'_>) -> Result<(), ScheduleError>,
{
    if comm_size == 0 {
        return Err(ScheduleError::EmptyCommunicator);
    }
    let comm = Communicator::world(comm_size);
    let mut schedule = Schedule::new(comm_size);
    build(&mut CommGraph::new(&mut schedule, &comm))?;
    Ok(schedule)
}
