//! Serializable description of one collective to compile.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cc::allreduce::{AllreduceAlgorithm, AllreduceParams, allreduce};
use crate::cc::alltoall::{AlltoallAlgorithm, AlltoallParams, alltoall};
use crate::cc::collective::CollectiveKind;
use crate::cc::group::{multi_allreduce, multi_alltoall};
use crate::cc::topology::Direction;
use crate::cc::tree::{binomial_tree, dissemination};
use crate::error::ScheduleError;
use crate::graph::Schedule;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectiveSpec {
    /// `binomialtree`, `dissemination`, `allreduce`, `alltoall`,
    /// `multi_allreduce` or `multi_alltoall`.
    pub collective: String,
    /// Allreduce: `ring`, `recdoub`, `datasize_based` (default).
    /// Alltoall: `windowed`, `balanced` (default), `unbalanced`.
    #[serde(default)]
    pub algorithm: Option<String>,
    /// Ranks per communicator (per group for the `multi_*` families).
    pub comm_size: usize,
    pub datasize: u64,
    #[serde(default)]
    pub tag: u32,
    /// Binomial tree only: `reduce` (default) or `bcast`.
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_num_comm_groups")]
    pub num_comm_groups: usize,
    #[serde(default)]
    pub compute_time: u64,
    /// Seed for unbalanced payload sizes; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_window_size() -> usize {
    1
}

fn default_num_comm_groups() -> usize {
    1
}

impl CollectiveSpec {
    pub fn new(collective: &str, comm_size: usize, datasize: u64) -> Self {
        Self {
            collective: collective.to_string(),
            algorithm: None,
            comm_size,
            datasize,
            tag: 0,
            direction: None,
            window_size: default_window_size(),
            num_comm_groups: default_num_comm_groups(),
            compute_time: 0,
            seed: None,
        }
    }

    pub fn allreduce_algorithm(&self) -> Result<AllreduceAlgorithm, ScheduleError> {
        self.algorithm
            .as_deref()
            .map_or(Ok(AllreduceAlgorithm::DatasizeBased), AllreduceAlgorithm::parse)
    }

    pub fn alltoall_algorithm(&self) -> Result<AlltoallAlgorithm, ScheduleError> {
        self.algorithm
            .as_deref()
            .map_or(Ok(AlltoallAlgorithm::Balanced), AlltoallAlgorithm::parse)
    }

    pub fn direction(&self) -> Result<Direction, ScheduleError> {
        self.direction
            .as_deref()
            .map_or(Ok(Direction::Reduce), Direction::parse)
    }

    fn allreduce_params(&self) -> AllreduceParams {
        AllreduceParams {
            datasize: self.datasize,
            base_tag: self.tag,
            compute_time: self.compute_time,
        }
    }

    fn alltoall_params(&self) -> AlltoallParams {
        AlltoallParams {
            datasize: self.datasize,
            tag: self.tag,
            window_size: self.window_size,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Validate every name up front, then compile the schedule.
    pub fn build(&self) -> Result<Schedule, ScheduleError> {
        let kind = CollectiveKind::parse(&self.collective)?;
        if self.comm_size == 0 || (kind.is_grouped() && self.num_comm_groups == 0) {
            return Err(ScheduleError::EmptyCommunicator);
        }
        let schedule = match kind {
            CollectiveKind::BinomialTree => {
                binomial_tree(self.comm_size, self.datasize, self.tag, self.direction()?)?
            }
            CollectiveKind::Dissemination => {
                dissemination(self.comm_size, self.datasize, self.tag)?
            }
            CollectiveKind::Allreduce => allreduce(
                self.allreduce_algorithm()?,
                self.comm_size,
                &self.allreduce_params(),
            )?,
            CollectiveKind::Alltoall => alltoall(
                self.alltoall_algorithm()?,
                self.comm_size,
                &self.alltoall_params(),
                &mut self.rng(),
            )?,
            CollectiveKind::MultiAllreduce => multi_allreduce(
                self.allreduce_algorithm()?,
                self.num_comm_groups,
                self.comm_size,
                &self.allreduce_params(),
            )?,
            CollectiveKind::MultiAlltoall => multi_alltoall(
                self.alltoall_algorithm()?,
                self.num_comm_groups,
                self.comm_size,
                &self.alltoall_params(),
                &mut self.rng(),
            )?,
        };
        info!(
            collective = %self.collective,
            ranks = schedule.num_ranks(),
            ops = schedule.num_ops(),
            edges = schedule.num_edges(),
            "schedule built"
        );
        Ok(schedule)
    }
}
