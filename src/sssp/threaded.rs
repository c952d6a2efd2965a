use std::borrow::Cow;
use std::sync::Barrier;

use parking_lot::Mutex;

use super::{
    assemble, reduce_candidates, validate_run, AdjacencyMatrix, Candidate, Collective,
    GlobalResult, PartitionPlan, RoundDriver, SsspError, VertexID, WorkerRun, WorkerState,
};

use log::{debug, error, info};

/// Slot table shared by the workers of one in-process run.
///
/// A reduction has two barrier phases: every worker publishes its candidate
/// and waits, then every worker folds the full table and waits again so no
/// one overwrites a slot before the slowest reader is done.
pub struct ThreadExchange {
    slots: Mutex<Vec<Candidate>>,
    barrier: Barrier,
    size: usize,
}

impl ThreadExchange {
    pub fn new(size: usize) -> Self {
        Self {
            slots: Mutex::new(vec![Candidate::NONE; size]),
            barrier: Barrier::new(size),
            size,
        }
    }

    /// The collective handle for worker `rank`
    pub fn member(&self, rank: usize) -> ThreadedCollective<'_> {
        assert!(rank < self.size, "rank {} outside a group of {}", rank, self.size);
        ThreadedCollective {
            exchange: self,
            rank,
        }
    }
}

pub struct ThreadedCollective<'x> {
    exchange: &'x ThreadExchange,
    rank: usize,
}

impl Collective for ThreadedCollective<'_> {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.exchange.size
    }

    fn min_loc(&self, local: Candidate) -> Result<Candidate, SsspError> {
        self.exchange.slots.lock()[self.rank] = local;
        self.exchange.barrier.wait();

        let winner = reduce_candidates(self.exchange.slots.lock().iter().copied());
        self.exchange.barrier.wait();

        Ok(winner)
    }
}

/// Runs `workers` workers on scoped threads, each on its own column slice,
/// and returns their local outcomes ordered by rank
pub fn run_workers(
    graph: &AdjacencyMatrix,
    source: usize,
    workers: usize,
) -> Result<Vec<WorkerRun>, SsspError> {
    if workers == 0 {
        let err = SsspError::NoWorkers;
        error!("{}", err);
        return Err(err);
    }
    validate_run(graph.vertex_count(), source)?;

    let plan = PartitionPlan::new(graph.vertex_count(), workers);
    let exchange = ThreadExchange::new(workers);
    info!(
        "Running {} workers over {} vertices, sizes {:?}",
        workers,
        graph.vertex_count(),
        plan.sizes()
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = plan
            .ranges()
            .enumerate()
            .map(|(rank, range)| {
                let exchange = &exchange;
                scope.spawn(move || {
                    crate::set_worker(rank);
                    debug!("Handling {} vertices in range {}", range.len(), range);

                    let state = WorkerState::new(
                        range,
                        graph.vertex_count(),
                        source,
                        Cow::Borrowed(graph.columns(range)),
                    )?;
                    let collective = exchange.member(rank);
                    RoundDriver::new(&collective, state).run()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| SsspError::Transport("worker thread panicked".into()))?
            })
            .collect()
    })
}

/// Multi-worker shortest paths inside this process
pub fn shortest_paths(
    graph: &AdjacencyMatrix,
    source: usize,
    workers: usize,
) -> Result<GlobalResult, SsspError> {
    let runs = run_workers(graph, source, workers)?;
    let plan = PartitionPlan::new(graph.vertex_count(), workers);
    assemble(&runs, &plan, VertexID(source))
}
