/// Concurrent topology access tests
///
/// Ownership reassignment is published as a whole-map swap; readers must
/// never observe a mix of old and new entries.
/// Run with: cargo test --test concurrent_topology_tests

use couchmock::{NodeDescriptor, Topology};
use std::sync::Arc;
use tokio::sync::Barrier;

fn topology(num_nodes: usize, num_vbuckets: u16) -> Arc<Topology> {
    let nodes = (0..num_nodes)
        .map(|i| NodeDescriptor::new("localhost", 8091 + i as u16, 11210 + i as u16))
        .collect();
    Arc::new(Topology::new(nodes, num_vbuckets))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_a_torn_map() {
    let topo = topology(2, 1024);
    topo.replace_partition_map(vec![Some(0); 1024]).unwrap();

    let barrier = Arc::new(Barrier::new(9));
    let mut handles = vec![];

    // 8 reader tasks: every snapshot must be uniformly old or uniformly new
    for _ in 0..8 {
        let topo = Arc::clone(&topo);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            for _ in 0..500 {
                let snapshot = topo.partition_map().unwrap();
                let first = snapshot[0];
                assert!(
                    snapshot.iter().all(|owner| *owner == first),
                    "torn partition map observed"
                );
            }
        }));
    }

    // 1 writer task flipping the whole map back and forth
    {
        let topo = Arc::clone(&topo);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            for round in 0..200usize {
                let owner = Some(round % 2);
                topo.replace_partition_map(vec![owner; 1024]).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn snapshots_stay_consistent_while_swaps_continue() {
    let topo = topology(3, 64);
    topo.assign_round_robin().unwrap();

    let snapshot = topo.partition_map().unwrap();
    let writer = {
        let topo = Arc::clone(&topo);
        tokio::spawn(async move {
            for _ in 0..100 {
                topo.replace_partition_map(vec![Some(2); 64]).unwrap();
                topo.assign_round_robin().unwrap();
            }
        })
    };

    // the snapshot taken before the swaps never changes underneath us
    for vb in 0..64usize {
        assert_eq!(snapshot[vb], Some(vb % 3));
    }

    writer.await.unwrap();
}
