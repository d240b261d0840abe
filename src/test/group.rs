use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cc::allreduce::{AllreduceAlgorithm, AllreduceParams};
use crate::cc::alltoall::{AlltoallAlgorithm, AlltoallParams};
use crate::cc::group::{block_partition, multi_allreduce, multi_alltoall};
use crate::error::ScheduleError;
use crate::graph::Schedule;

fn assert_groups_isolated(schedule: &Schedule, comm_size: usize) {
    for (id, op) in schedule.iter() {
        let group = id.rank / comm_size;
        if let Some(peer) = op.peer() {
            assert_eq!(peer / comm_size, group, "op {id:?} talks across groups");
        }
        for dep in &op.requires {
            assert_eq!(dep.rank / comm_size, group, "op {id:?} depends across groups");
        }
    }
}

#[test]
fn block_partition_colors_consecutive_ranks() {
    let part = block_partition(3, 4).expect("partition");
    assert_eq!(part.groups.len(), 3);
    let colors: Vec<usize> = part.placement.iter().map(|p| p.group).collect();
    assert_eq!(colors, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
    let keys: Vec<usize> = part.placement.iter().map(|p| p.local_rank).collect();
    assert_eq!(keys, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3]);
    assert!(part.groups.iter().all(|g| g.size() == 4));
    assert_eq!(
        block_partition(0, 4).unwrap_err(),
        ScheduleError::EmptyCommunicator
    );
}

#[test]
fn multi_allreduce_runs_one_ring_per_group() {
    let p = AllreduceParams {
        datasize: 100,
        base_tag: 0,
        compute_time: 0,
    };
    let schedule = multi_allreduce(AllreduceAlgorithm::Ring, 3, 4, &p).expect("build");
    assert_eq!(schedule.num_ranks(), 12);
    assert_groups_isolated(&schedule, 4);
    for rank in 0..12 {
        assert_eq!(schedule.ops(rank).len(), 12);
    }
    // Local rank 3 of group 1 wraps to local rank 0, i.e. global 4.
    assert_eq!(schedule.ops(7)[0].peer(), Some(4));
}

#[test]
fn multi_alltoall_stays_inside_groups() {
    let p = AlltoallParams {
        datasize: 32,
        tag: 0,
        window_size: 1,
    };
    let mut rng = StdRng::seed_from_u64(1);
    let schedule =
        multi_alltoall(AlltoallAlgorithm::Unbalanced, 2, 3, &p, &mut rng).expect("build");
    assert_eq!(schedule.num_ranks(), 6);
    assert_groups_isolated(&schedule, 3);
    let mut peers: Vec<usize> = schedule
        .ops(4)
        .iter()
        .filter(|op| op.is_send())
        .filter_map(|op| op.peer())
        .collect();
    peers.sort_unstable();
    assert_eq!(peers, vec![3, 5]);
}
