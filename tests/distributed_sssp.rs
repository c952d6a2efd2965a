use std::borrow::Cow;
use std::time::Instant;

use distributed_dijkstra::*;
use mpi::{
    collective::SystemOperation,
    traits::{Communicator, CommunicatorCollectives},
};

/// 0->1 (1), 1->2 (2), 0->2 (5), 2->3 (1)
fn reference_graph() -> AdjacencyMatrix {
    AdjacencyMatrix::from_edges(4, &[(0, 1, 1.0), (1, 2, 2.0), (0, 2, 5.0), (2, 3, 1.0)]).unwrap()
}

/// 11 vertices, a few equal-length paths and one unreachable vertex (10)
fn larger_graph() -> AdjacencyMatrix {
    AdjacencyMatrix::from_edges(
        11,
        &[
            (0, 1, 2.0),
            (0, 2, 1.0),
            (2, 1, 1.0),
            (1, 3, 3.0),
            (2, 4, 4.0),
            (3, 5, 1.0),
            (4, 5, 0.5),
            (5, 6, 2.0),
            (6, 7, 1.0),
            (7, 8, 1.0),
            (8, 9, 1.0),
            (9, 0, 1.0),
            (6, 9, 2.0),
        ],
    )
    .unwrap()
}

fn test_reference_graph(world: &mpi::topology::SimpleCommunicator) -> anyhow::Result<()> {
    let result = mpicommlayer::shortest_paths(world, 0, || Ok(reference_graph()))?;

    match result {
        Some(result) => {
            assert_eq!(world.rank(), mpicommlayer::ROOT);
            assert_eq!(result.distances(), &[0.0, 1.0, 3.0, 4.0]);
            assert_eq!(result.predecessors(), &[-1, 0, 1, 2]);
            assert_eq!(result.termination(), Termination::AllProcessed);
        }
        None => assert_ne!(world.rank(), mpicommlayer::ROOT),
    }

    if world.rank() == 0 {
        println!("test_reference_graph passed");
    }
    Ok(())
}

fn test_matches_serial(world: &mpi::topology::SimpleCommunicator) -> anyhow::Result<()> {
    let graph = larger_graph();

    for source in [0, 4, 10] {
        let result = mpicommlayer::shortest_paths(world, source, || Ok(larger_graph()))?;

        if let Some(result) = result {
            let expected = serial::shortest_paths(&graph, source)?;
            assert_eq!(result, expected, "source {}", source);
            assert!(result.rounds() <= graph.vertex_count());
        }
    }

    if world.rank() == 0 {
        println!("test_matches_serial passed");
    }
    Ok(())
}

fn test_settled_sets_agree(world: &mpi::topology::SimpleCommunicator) -> anyhow::Result<()> {
    let graph = larger_graph();
    let size = world.size() as usize;
    let rank = world.rank() as usize;

    // every rank slices its own columns, no scatter needed
    let plan = PartitionPlan::new(graph.vertex_count(), size);
    let range = plan.range_of(rank);
    let state = WorkerState::new(
        range,
        graph.vertex_count(),
        0,
        Cow::Borrowed(graph.columns(range)),
    )?;

    let collective = MpiCollective::new(world);
    let run = RoundDriver::new(&collective, state).run()?;

    // fold the settle order into a position-weighted checksum
    let checksum: usize = run
        .settled
        .iter()
        .enumerate()
        .map(|(pos, v)| (pos + 1) * (v.0 + 1))
        .sum();

    for local in [checksum, run.rounds, run.settled.len()] {
        let mut max = 0usize;
        let mut min = 0usize;
        world.all_reduce_into(&local, &mut max, SystemOperation::max());
        world.all_reduce_into(&local, &mut min, SystemOperation::min());
        assert_eq!(max, min);
    }

    assert_eq!(run.termination, Termination::NoReachableCandidate);
    assert_eq!(run.settled.len(), 10);

    if rank == 0 {
        println!("test_settled_sets_agree passed");
    }
    Ok(())
}

fn test_invalid_runs_stop_every_rank(
    world: &mpi::topology::SimpleCommunicator,
) -> anyhow::Result<()> {
    let result = mpicommlayer::shortest_paths(world, 4, || Ok(reference_graph()));
    assert!(matches!(result, Err(SsspError::InvalidSource { .. })));

    let result = mpicommlayer::shortest_paths(world, 0, || {
        AdjacencyMatrix::from_file("/definitely/not/here/graph.dat")
    });
    if world.rank() == mpicommlayer::ROOT {
        assert!(matches!(result, Err(SsspError::Load(_))));
    } else {
        assert!(matches!(result, Err(SsspError::EmptyGraph)));
    }

    // a header far larger than the input is rejected, not allocated
    let result = mpicommlayer::shortest_paths(world, 0, || {
        AdjacencyMatrix::parse("3037000499\n1 2 3")
    });
    if world.rank() == mpicommlayer::ROOT {
        assert!(matches!(
            result,
            Err(SsspError::Load(LoadError::Malformed(_)))
        ));
    } else {
        assert!(matches!(result, Err(SsspError::EmptyGraph)));
    }

    if world.rank() == 0 {
        println!("test_invalid_runs_stop_every_rank passed");
    }
    Ok(())
}

fn test_algorithm_starts_after_load(
    world: &mpi::topology::SimpleCommunicator,
) -> anyhow::Result<()> {
    let mut loaded = None;
    let (result, algorithm_started) = mpicommlayer::shortest_paths_timed(world, 0, || {
        loaded = Some(Instant::now());
        Ok(reference_graph())
    })?;

    if world.rank() == mpicommlayer::ROOT {
        let loaded = loaded.expect("root loads the matrix");
        assert!(algorithm_started >= loaded);
        assert!(result.is_some());
    } else {
        assert!(loaded.is_none());
        assert!(result.is_none());
    }

    if world.rank() == 0 {
        println!("test_algorithm_starts_after_load passed");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let (_universe, world) = distributed_dijkstra::init(None)?;

    test_reference_graph(&world)?;
    test_matches_serial(&world)?;
    test_settled_sets_agree(&world)?;
    test_invalid_runs_stop_every_rank(&world)?;
    test_algorithm_starts_after_load(&world)?;

    // Ensure all processes are done before finalizing MPI
    world.barrier();

    if world.rank() == 0 {
        println!("Integration Test Passed!");
    }
    Ok(())
}
