use crate::cc::allreduce::{
    AllreduceAlgorithm, AllreduceParams, DATASIZE_THRESHOLD, allreduce, ring_chunk_bytes,
};
use crate::error::ScheduleError;
use crate::graph::{Op, OpId, Schedule};

fn params(datasize: u64) -> AllreduceParams {
    AllreduceParams {
        datasize,
        base_tag: 0,
        compute_time: 0,
    }
}

fn recv_sizes(ops: &[Op]) -> Vec<u64> {
    ops.iter()
        .filter(|op| op.is_recv())
        .filter_map(|op| op.size())
        .collect()
}

fn peers(ops: &[Op], send: bool) -> Vec<usize> {
    ops.iter()
        .filter(|op| op.is_send() == send)
        .filter_map(|op| op.peer())
        .collect()
}

#[test]
fn parse_allreduce_names() {
    assert_eq!(
        AllreduceAlgorithm::parse("ring").unwrap(),
        AllreduceAlgorithm::Ring
    );
    assert_eq!(
        AllreduceAlgorithm::parse("RecDoub").unwrap(),
        AllreduceAlgorithm::RecDoub
    );
    assert_eq!(
        "datasize_based".parse::<AllreduceAlgorithm>().unwrap(),
        AllreduceAlgorithm::DatasizeBased
    );
    assert_eq!(
        AllreduceAlgorithm::parse("tree"),
        Err(ScheduleError::UnknownAllreduce("tree".to_string()))
    );
}

#[test]
fn datasize_based_switches_at_threshold() {
    let algo = AllreduceAlgorithm::DatasizeBased;
    assert_eq!(algo.resolve(DATASIZE_THRESHOLD - 1), AllreduceAlgorithm::RecDoub);
    assert_eq!(algo.resolve(DATASIZE_THRESHOLD), AllreduceAlgorithm::Ring);
    assert_eq!(AllreduceAlgorithm::Ring.resolve(1), AllreduceAlgorithm::Ring);

    let small = allreduce(algo, 4, &params(1000)).expect("build");
    assert_eq!(recv_sizes(small.ops(0)), vec![500, 250, 250, 500]);

    let large = allreduce(algo, 4, &params(8192)).expect("build");
    assert_eq!(recv_sizes(large.ops(0)), vec![2048; 6]);
}

#[test]
fn recdoub_halves_then_regrows_chunks() {
    let schedule = allreduce(AllreduceAlgorithm::RecDoub, 8, &params(1024)).expect("build");
    for rank in 0..8 {
        let ops = schedule.ops(rank);
        assert_eq!(ops.len(), 12);
        assert_eq!(recv_sizes(ops), vec![512, 256, 128, 128, 256, 512]);
        assert_eq!(
            peers(ops, true),
            vec![rank ^ 1, rank ^ 2, rank ^ 4, rank ^ 4, rank ^ 2, rank ^ 1]
        );
        let tags: Vec<u32> = ops.iter().filter_map(|op| op.tag()).collect();
        assert_eq!(&tags[..6], &[0; 6]);
        assert_eq!(&tags[6..], &[1; 6]);

        // Allgather hangs off the last reduce-scatter receive.
        let handle = OpId { rank, index: 5 };
        assert_eq!(ops[6].requires, vec![handle]);
        assert_eq!(ops[7].requires, vec![handle]);
        assert!(ops[0].requires.is_empty());
        assert_eq!(ops[2].requires, vec![OpId { rank, index: 1 }]);
    }
}

#[test]
fn recdoub_rejects_non_power_of_two() {
    assert_eq!(
        allreduce(AllreduceAlgorithm::RecDoub, 6, &params(1024)),
        Err(ScheduleError::NotPowerOfTwo(6))
    );
    assert_eq!(
        allreduce(AllreduceAlgorithm::DatasizeBased, 12, &params(64)),
        Err(ScheduleError::NotPowerOfTwo(12))
    );
}

#[test]
fn ring_uses_neighbours_and_rounded_chunks() {
    assert_eq!(ring_chunk_bytes(100, 4), 25);
    assert_eq!(ring_chunk_bytes(100, 3), 34);
    assert_eq!(ring_chunk_bytes(100, 1), 100);

    let schedule = allreduce(AllreduceAlgorithm::Ring, 4, &params(100)).expect("build");
    for rank in 0..4 {
        let ops = schedule.ops(rank);
        assert_eq!(ops.len(), 12);
        assert!(ops.iter().all(|op| op.size() == Some(25)));
        let pred = (rank + 3) % 4;
        let succ = (rank + 1) % 4;
        let sent = peers(ops, true);
        let got = peers(ops, false);
        assert_eq!(&sent[..3], &[succ; 3]);
        assert_eq!(&got[..3], &[pred; 3]);
        assert_eq!(&sent[3..], &[pred; 3]);
        assert_eq!(&got[3..], &[succ; 3]);
        assert_eq!(ops[6].requires, vec![OpId { rank, index: 5 }]);
    }
}

#[test]
fn allgather_tag_follows_base_tag() {
    let p = AllreduceParams {
        datasize: 64,
        base_tag: 7,
        compute_time: 0,
    };
    for algo in [AllreduceAlgorithm::Ring, AllreduceAlgorithm::RecDoub] {
        let schedule = allreduce(algo, 4, &p).expect("build");
        let tags: Vec<u32> = schedule.ops(2).iter().filter_map(|op| op.tag()).collect();
        let half = tags.len() / 2;
        assert!(tags[..half].iter().all(|&t| t == 7));
        assert!(tags[half..].iter().all(|&t| t == 8));
    }
}

#[test]
fn compute_time_inserts_calc_between_phases() {
    let p = AllreduceParams {
        datasize: 64,
        base_tag: 0,
        compute_time: 10,
    };
    let schedule = allreduce(AllreduceAlgorithm::Ring, 2, &p).expect("build");
    // send, recv, calc | send, recv, calc
    let ops = schedule.ops(0);
    assert_eq!(ops.len(), 6);
    assert_eq!(ops[2].size(), None);
    assert_eq!(ops[2].requires, vec![OpId { rank: 0, index: 1 }]);
    assert_eq!(ops[3].requires, vec![OpId { rank: 0, index: 2 }]);
}

#[test]
fn trivial_communicators() {
    let one: Schedule = allreduce(AllreduceAlgorithm::Ring, 1, &params(64)).expect("build");
    assert_eq!(one.num_ops(), 0);
    assert_eq!(
        allreduce(AllreduceAlgorithm::Ring, 0, &params(64)),
        Err(ScheduleError::EmptyCommunicator)
    );
}

#[test]
fn base_tag_must_leave_room_for_allgather() {
    let p = AllreduceParams {
        datasize: 64,
        base_tag: u32::MAX,
        compute_time: 0,
    };
    for algo in [AllreduceAlgorithm::Ring, AllreduceAlgorithm::RecDoub] {
        assert_eq!(
            allreduce(algo, 2, &p),
            Err(ScheduleError::TagOverflow(u32::MAX))
        );
    }

    let p = AllreduceParams {
        base_tag: u32::MAX - 1,
        ..p
    };
    let schedule = allreduce(AllreduceAlgorithm::Ring, 2, &p).expect("build");
    let tags: Vec<u32> = schedule.ops(0).iter().filter_map(|op| op.tag()).collect();
    assert_eq!(tags, vec![u32::MAX - 1, u32::MAX - 1, u32::MAX, u32::MAX]);
}

#[test]
fn datasize_based_on_existing_graph_follows_resolve() {
    use crate::cc::allreduce::allreduce_on;
    use crate::graph::{CommGraph, Communicator};

    let comm = Communicator::world(4);
    for datasize in [DATASIZE_THRESHOLD - 4, DATASIZE_THRESHOLD] {
        let mut schedule = Schedule::new(4);
        let mut g = CommGraph::new(&mut schedule, &comm);
        let p = params(datasize);
        allreduce_on(&mut g, AllreduceAlgorithm::DatasizeBased, &p).expect("build");
        let expected = allreduce(
            AllreduceAlgorithm::DatasizeBased.resolve(datasize),
            4,
            &p,
        )
        .expect("build");
        assert_eq!(schedule, expected);
    }
}
