//! JSON trace document.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::graph::{OpId, OpKind, Schedule};

pub const TRACE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDoc {
    pub schema_version: u32,
    pub num_ranks: usize,
    pub ranks: Vec<RankTrace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankTrace {
    pub rank: usize,
    pub ops: Vec<OpRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpRecord {
    /// Position in the rank's op list.
    pub id: usize,
    #[serde(flatten)]
    pub kind: OpRecordKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<OpId>,
}

/// `peer` is the destination of a send and the source of a receive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpRecordKind {
    Send { peer: usize, size: u64, tag: u32 },
    Recv { peer: usize, size: u64, tag: u32 },
    Calc { cost: u64 },
}

impl From<OpKind> for OpRecordKind {
    fn from(kind: OpKind) -> Self {
        match kind {
            OpKind::Send { dst, size, tag } => Self::Send {
                peer: dst,
                size,
                tag,
            },
            OpKind::Recv { src, size, tag } => Self::Recv {
                peer: src,
                size,
                tag,
            },
            OpKind::Calc { cost } => Self::Calc { cost },
        }
    }
}

impl From<&Schedule> for TraceDoc {
    fn from(schedule: &Schedule) -> Self {
        let ranks = (0..schedule.num_ranks())
            .map(|rank| RankTrace {
                rank,
                ops: schedule
                    .ops(rank)
                    .iter()
                    .enumerate()
                    .map(|(id, op)| OpRecord {
                        id,
                        kind: op.kind.into(),
                        requires: op.requires.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            schema_version: TRACE_SCHEMA_VERSION,
            num_ranks: schedule.num_ranks(),
            ranks,
        }
    }
}

pub fn write_json<W: Write>(schedule: &Schedule, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &TraceDoc::from(schedule))?;
    writeln!(out)
}
