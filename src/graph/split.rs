//! Color/key partitioning of a rank set.

use std::collections::BTreeMap;

use super::comm::Communicator;
use crate::error::ScheduleError;

/// Where a rank landed after a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub group: usize,
    pub local_rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Groups in ascending color order.
    pub groups: Vec<Communicator>,
    /// Indexed by input rank.
    pub placement: Vec<Placement>,
}

/// Partition ranks `0..colors.len()` by color. Inside a group, ranks are
/// ordered by `(key, rank)`.
pub fn split(colors: &[usize], keys: &[usize]) -> Result<Partition, ScheduleError> {
    if keys.len() != colors.len() {
        return Err(ScheduleError::LengthMismatch {
            what: "keys",
            got: keys.len(),
            expected: colors.len(),
        });
    }

    let mut by_color: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
    for (rank, (&color, &key)) in colors.iter().zip(keys).enumerate() {
        by_color.entry(color).or_default().push((key, rank));
    }

    let mut groups = Vec::with_capacity(by_color.len());
    let mut placement = vec![Placement::default(); colors.len()];
    for (group, (_, mut members)) in by_color.into_iter().enumerate() {
        members.sort_unstable();
        for (local_rank, &(_, rank)) in members.iter().enumerate() {
            placement[rank] = Placement { group, local_rank };
        }
        groups.push(Communicator::from_members(
            members.into_iter().map(|(_, rank)| rank).collect(),
        ));
    }

    Ok(Partition { groups, placement })
}
