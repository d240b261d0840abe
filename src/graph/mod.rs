//! Per-rank operation graph.
//!
//! A [`Schedule`] stores every rank's send/recv/calc operations in creation
//! order together with their dependency edges. A [`Communicator`] is a view
//! over a subset of the schedule's ranks with its own local numbering, and
//! [`CommGraph`] ties the two together so collective builders can speak in
//! local ranks only.

mod comm;
mod id;
mod op;
mod schedule;
mod split;

pub use comm::{CommGraph, Communicator};
pub use id::OpId;
pub use op::{Op, OpKind};
pub use schedule::Schedule;
pub use split::{Partition, Placement, split};
