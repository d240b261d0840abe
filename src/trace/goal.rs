//! GOAL text writer.
//!
//! ```text
//! num_ranks 2
//!
//! rank 0 {
//! l0: send 8b to 1 tag 0
//! l1: recv 8b from 1 tag 0
//! l1 requires l0
//! }
//! ```

use std::io::{self, Write};

use tracing::debug;

use crate::graph::{OpKind, Schedule};

pub fn write_goal<W: Write>(schedule: &Schedule, out: &mut W) -> io::Result<()> {
    writeln!(out, "num_ranks {}", schedule.num_ranks())?;
    for rank in 0..schedule.num_ranks() {
        let ops = schedule.ops(rank);
        writeln!(out)?;
        writeln!(out, "rank {rank} {{")?;
        for (index, op) in ops.iter().enumerate() {
            match op.kind {
                OpKind::Send { dst, size, tag } => {
                    writeln!(out, "l{index}: send {size}b to {dst} tag {tag}")?
                }
                OpKind::Recv { src, size, tag } => {
                    writeln!(out, "l{index}: recv {size}b from {src} tag {tag}")?
                }
                OpKind::Calc { cost } => writeln!(out, "l{index}: calc {cost}")?,
            }
        }
        for (index, op) in ops.iter().enumerate() {
            for dep in &op.requires {
                if dep.rank != rank {
                    // GOAL has no syntax for edges between ranks.
                    debug!(rank, op = index, dep_rank = dep.rank, "skipping cross-rank edge");
                    continue;
                }
                writeln!(out, "l{index} requires l{}", dep.index)?;
            }
        }
        writeln!(out, "}}")?;
    }
    Ok(())
}
