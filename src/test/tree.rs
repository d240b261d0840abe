use crate::cc::topology::{Direction, binomial_step, ceil_log2, dissemination_peers};
use crate::cc::tree::{binomial_tree, dissemination};
use crate::graph::{OpId, Schedule};

fn sends(schedule: &Schedule, rank: usize) -> Vec<usize> {
    schedule
        .ops(rank)
        .iter()
        .filter(|op| op.is_send())
        .filter_map(|op| op.peer())
        .collect()
}

fn recvs(schedule: &Schedule, rank: usize) -> Vec<usize> {
    schedule
        .ops(rank)
        .iter()
        .filter(|op| op.is_recv())
        .filter_map(|op| op.peer())
        .collect()
}

#[test]
fn binomial_step_peers() {
    let s = binomial_step(0, 8, 2);
    assert_eq!(s.child, Some(4));
    assert_eq!(s.parent, None);
    let s = binomial_step(5, 8, 2);
    assert_eq!(s.child, None);
    assert_eq!(s.parent, Some(1));
    // 2 + 4 >= 6 ranks: no child at step 2.
    assert_eq!(binomial_step(2, 6, 2).child, None);
}

#[test]
fn dissemination_peer_lists() {
    assert_eq!(dissemination_peers(0, 5), vec![(1, 4), (2, 3), (4, 1)]);
    assert!(dissemination_peers(0, 1).is_empty());
}

#[test]
fn dissemination_has_ceil_log2_steps_chained_on_recv() {
    for ranks in 2..=9 {
        let schedule = dissemination(ranks, 16, 0).expect("build");
        let steps = ceil_log2(ranks);
        for rank in 0..ranks {
            let ops = schedule.ops(rank);
            assert_eq!(ops.len(), 2 * steps);
            for step in 0..steps {
                let send = &ops[2 * step];
                let recv = &ops[2 * step + 1];
                assert!(send.is_send());
                assert!(recv.is_recv());
                assert!(recv.requires.is_empty());
                if step == 0 {
                    assert!(send.requires.is_empty());
                } else {
                    assert_eq!(
                        send.requires,
                        vec![OpId {
                            rank,
                            index: 2 * step - 1
                        }]
                    );
                }
            }
        }
    }
}

#[test]
fn dissemination_peers_for_five_ranks() {
    let schedule = dissemination(5, 16, 0).expect("build");
    assert_eq!(sends(&schedule, 0), vec![1, 2, 4]);
    assert_eq!(recvs(&schedule, 0), vec![4, 3, 1]);
}

#[test]
fn binomial_reduce_every_rank_but_root_sends_once_downwards() {
    for ranks in 2..=17 {
        let schedule = binomial_tree(ranks, 64, 0, Direction::Reduce).expect("build");
        assert!(sends(&schedule, 0).is_empty(), "root sends with {ranks} ranks");
        for rank in 1..ranks {
            let s = sends(&schedule, rank);
            assert_eq!(s.len(), 1, "rank {rank} of {ranks}");
            assert!(s[0] < rank);
        }
        let total_recvs: usize = (0..ranks).map(|r| recvs(&schedule, r).len()).sum();
        assert_eq!(total_recvs, ranks - 1);
    }
}

#[test]
fn binomial_reduce_send_waits_for_every_child() {
    let schedule = binomial_tree(8, 64, 0, Direction::Reduce).expect("build");
    assert_eq!(recvs(&schedule, 0), vec![1, 2, 4]);

    // rank 1: send to 0, then receives from 3 and 5.
    let ops = schedule.ops(1);
    assert_eq!(ops.len(), 3);
    assert_eq!(ops[0].peer(), Some(0));
    assert!(ops[0].is_send());
    assert_eq!(ops[1].peer(), Some(3));
    assert_eq!(ops[2].peer(), Some(5));
    assert_eq!(
        ops[0].requires,
        vec![OpId { rank: 1, index: 1 }, OpId { rank: 1, index: 2 }]
    );

    // Leaves only send.
    assert_eq!(schedule.ops(7).len(), 1);
    assert!(schedule.ops(7)[0].requires.is_empty());
}

#[test]
fn binomial_broadcast_children_wait_for_parent() {
    let schedule = binomial_tree(8, 64, 3, Direction::Broadcast).expect("build");
    assert_eq!(sends(&schedule, 0), vec![1, 2, 4]);
    assert!(schedule.ops(0).iter().all(|op| op.requires.is_empty()));
    for rank in 1..8 {
        assert_eq!(recvs(&schedule, rank).len(), 1);
    }
    assert_eq!(recvs(&schedule, 7), vec![3]);

    let ops = schedule.ops(1);
    assert!(ops[0].is_recv());
    assert_eq!(ops[0].peer(), Some(0));
    assert_eq!(sends(&schedule, 1), vec![3, 5]);
    let parent = OpId { rank: 1, index: 0 };
    assert_eq!(ops[1].requires, vec![parent]);
    assert_eq!(ops[2].requires, vec![parent]);
    assert!(ops.iter().all(|op| op.tag() == Some(3)));
}

#[test]
fn single_rank_tree_is_empty() {
    let schedule = binomial_tree(1, 64, 0, Direction::Reduce).expect("build");
    assert_eq!(schedule.num_ranks(), 1);
    assert_eq!(schedule.num_ops(), 0);
}
