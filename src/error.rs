//! Errors raised while building a schedule.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unknown collective: {0}")]
    UnknownCollective(String),

    #[error("allreduce algorithm {0} not implemented")]
    UnknownAllreduce(String),

    #[error("alltoall algorithm {0} not implemented")]
    UnknownAlltoall(String),

    #[error("direction {0} in binomialtree not implemented")]
    UnknownDirection(String),

    #[error("unknown trace format: {0}")]
    UnknownFormat(String),

    #[error("recursive doubling needs a power-of-two communicator, got {0} ranks")]
    NotPowerOfTwo(usize),

    #[error("communicator must contain at least one rank")]
    EmptyCommunicator,

    #[error("tag space exhausted after tag {0}")]
    TagOverflow(u32),

    #[error("rank {rank} is outside a communicator of {size} ranks")]
    RankOutOfRange { rank: usize, size: usize },

    #[error("window size must be at least 1")]
    ZeroWindow,

    #[error("length mismatch: {what} has {got} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("operation l{index} does not exist on rank {rank}")]
    UnknownOp { rank: usize, index: usize },
}
