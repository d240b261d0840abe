//! Collective family names.

use crate::error::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectiveKind {
    BinomialTree,
    Dissemination,
    Allreduce,
    Alltoall,
    MultiAllreduce,
    MultiAlltoall,
}

impl CollectiveKind {
    /// Case-insensitive; `_` and `-` are ignored.
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        match compact_name(raw).as_str() {
            "binomialtree" => Ok(Self::BinomialTree),
            "dissemination" => Ok(Self::Dissemination),
            "allreduce" => Ok(Self::Allreduce),
            "alltoall" => Ok(Self::Alltoall),
            "multiallreduce" => Ok(Self::MultiAllreduce),
            "multialltoall" => Ok(Self::MultiAlltoall),
            _ => Err(ScheduleError::UnknownCollective(raw.to_string())),
        }
    }

    /// Whether the family runs once per sub-group.
    pub fn is_grouped(self) -> bool {
        matches!(self, Self::MultiAllreduce | Self::MultiAlltoall)
    }
}

/// Lowercase `raw` and drop `_`/`-` so `all_to_all` and `AllToAll` compare equal.
pub(crate) fn compact_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .collect()
}
