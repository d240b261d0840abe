//! Schedule serialization.
//!
//! - `goal`: GOAL text, one `rank r { ... }` block per rank
//! - `json`: structured dump for tooling (`serde_json`)

pub mod goal;
pub mod json;

use std::io::Write;

use crate::error::ScheduleError;
use crate::graph::Schedule;

pub use goal::write_goal;
pub use json::{OpRecord, OpRecordKind, RankTrace, TraceDoc, write_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    #[default]
    Goal,
    Json,
}

impl TraceFormat {
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        match raw.trim().to_lowercase().as_str() {
            "goal" => Ok(Self::Goal),
            "json" => Ok(Self::Json),
            _ => Err(ScheduleError::UnknownFormat(raw.to_string())),
        }
    }

    pub fn write<W: Write>(self, schedule: &Schedule, out: &mut W) -> std::io::Result<()> {
        match self {
            Self::Goal => write_goal(schedule, out),
            Self::Json => write_json(schedule, out),
        }
    }
}
