use std::borrow::Cow;
use std::time::Instant;

use super::{
    reduce_candidates, validate_run, AdjacencyMatrix, Candidate, Collective, GlobalResult,
    LoadError, PartitionPlan, ResultAssembler, RoundDriver, SsspError, VertexID, WorkerState,
};

use log::{debug, error, info};

use mpi::{
    datatype::{Partition, PartitionMut},
    topology::SimpleCommunicator,
    traits::{Communicator, CommunicatorCollectives, Root},
    Count, Rank,
};

/// Rank that loads the matrix and assembles the result
pub const ROOT: Rank = 0;

/// MIN-with-location over an MPI communicator.
///
/// Every rank all-gathers the candidates and folds them with
/// [`Candidate::better_of`], so the tie-break does not depend on the MPI
/// implementation's MINLOC.
pub struct MpiCollective<'a> {
    world: &'a SimpleCommunicator,
    rank: usize,
    size: usize,
}

impl std::fmt::Debug for MpiCollective<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpiCollective")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<'a> MpiCollective<'a> {
    pub fn new(world: &'a SimpleCommunicator) -> Self {
        Self {
            world,
            rank: world.rank() as usize,
            size: world.size() as usize,
        }
    }
}

impl Collective for MpiCollective<'_> {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn min_loc(&self, local: Candidate) -> Result<Candidate, SsspError> {
        let mut candidates = vec![Candidate::NONE; self.size];
        self.world.all_gather_into(&local, &mut candidates[..]);
        Ok(reduce_candidates(candidates))
    }
}

/// Converts element counts or offsets to MPI's `Count`
fn to_counts(values: &[usize]) -> Result<Vec<Count>, SsspError> {
    values
        .iter()
        .map(|&value| {
            Count::try_from(value).map_err(|_| {
                let err =
                    SsspError::Transport(format!("{} elements exceed the MPI count range", value));
                error!("{}", err);
                err
            })
        })
        .collect()
}

/// Distributed shortest paths over `world`.
///
/// `load` only runs on [`ROOT`]; the vertex count is broadcast and every rank
/// validates it on its own, so a failed load or a bad source stops all ranks
/// before the round loop. The assembled result is returned on the root only.
pub fn shortest_paths<F>(
    world: &SimpleCommunicator,
    source: usize,
    load: F,
) -> Result<Option<GlobalResult>, SsspError>
where
    F: FnOnce() -> Result<AdjacencyMatrix, LoadError>,
{
    shortest_paths_timed(world, source, load).map(|(result, _)| result)
}

/// [`shortest_paths`], also returning when the round loop started, i.e. once
/// the matrix was loaded and this rank's columns arrived
pub fn shortest_paths_timed<F>(
    world: &SimpleCommunicator,
    source: usize,
    load: F,
) -> Result<(Option<GlobalResult>, Instant), SsspError>
where
    F: FnOnce() -> Result<AdjacencyMatrix, LoadError>,
{
    let rank = world.rank() as usize;
    let size = world.size() as usize;
    let root = world.process_at_rank(ROOT);
    let is_root = world.rank() == ROOT;

    let (graph, load_error) = if is_root {
        match load() {
            Ok(graph) => (Some(graph), None),
            Err(err) => {
                error!("{}", err);
                (None, Some(err))
            }
        }
    } else {
        (None, None)
    };

    // an unreadable source travels as an empty graph
    let mut vertex_count = graph.as_ref().map_or(0, AdjacencyMatrix::vertex_count);
    root.broadcast_into(&mut vertex_count);
    debug!("Broadcast vertex count: {}", vertex_count);

    if let Some(err) = load_error {
        return Err(err.into());
    }
    validate_run(vertex_count, source)?;

    let plan = PartitionPlan::new(vertex_count, size);
    let range = plan.range_of(rank);
    info!(
        "This process will handle {} vertices in range {}",
        range.len(),
        range
    );
    if is_root {
        info!(
            "Source vertex {} is owned by rank {:?}",
            source,
            plan.owner_of(source)
        );
    }

    // scatter the matrix columns
    let column_counts = to_counts(&plan.scaled_sizes(vertex_count))?;
    let column_displs = to_counts(&plan.displacements_with_stride(vertex_count))?;
    let mut columns = vec![0.0f64; range.len() * vertex_count];

    if let Some(graph) = graph.as_ref() {
        let send = Partition::new(graph.as_column_major(), &column_counts[..], &column_displs[..]);
        root.scatter_varcount_into_root(&send, &mut columns[..]);
    } else {
        root.scatter_varcount_into(&mut columns[..]);
    }
    drop(graph);
    debug!("Received {} matrix weights", columns.len());

    let collective = MpiCollective::new(world);
    let state = WorkerState::new(range, vertex_count, source, Cow::Owned(columns))?;
    let algorithm_started = Instant::now();
    let run = RoundDriver::new(&collective, state).run()?;

    // gather local results into the root's global arrays
    if is_root {
        let counts = to_counts(plan.sizes())?;
        let displs = to_counts(plan.displacements())?;

        let mut assembler = ResultAssembler::new(&plan);
        {
            let (distances, predecessors) = assembler.gather_targets();

            let mut recv = PartitionMut::new(distances, &counts[..], &displs[..]);
            root.gather_varcount_into_root(&run.distances[..], &mut recv);

            let mut recv = PartitionMut::new(predecessors, &counts[..], &displs[..]);
            root.gather_varcount_into_root(&run.predecessors[..], &mut recv);
        }
        info!("Gathered results from {} ranks", size);

        let result = assembler.finish(VertexID(source), run.termination, run.rounds)?;
        Ok((Some(result), algorithm_started))
    } else {
        root.gather_varcount_into(&run.distances[..]);
        root.gather_varcount_into(&run.predecessors[..]);
        Ok((None, algorithm_started))
    }
}
