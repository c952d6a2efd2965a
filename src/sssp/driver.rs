use super::{Collective, SsspError, VertexID, VertexRange, WorkerState};

use log::{debug, error, info, trace};

/// Why the round loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// every vertex was settled
    AllProcessed,
    /// the reduction found no finite candidate; the rest is unreachable
    NoReachableCandidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Running,
    Terminated(Termination),
}

/// What one worker holds after the loop terminated
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRun {
    pub rank: usize,
    pub range: VertexRange,
    pub distances: Vec<f64>,
    pub predecessors: Vec<i64>,
    /// global settle order, identical on every worker
    pub settled: Vec<VertexID>,
    /// number of reductions performed
    pub rounds: usize,
    pub termination: Termination,
}

/// Checks done once, before any worker allocates state
pub fn validate_run(vertex_count: usize, source: usize) -> Result<(), SsspError> {
    if vertex_count == 0 {
        let err = SsspError::EmptyGraph;
        error!("{}", err);
        return Err(err);
    }
    if source >= vertex_count {
        let err = SsspError::InvalidSource {
            vertex: source,
            vertex_count,
        };
        error!("{}", err);
        return Err(err);
    }
    Ok(())
}

/// Runs the symmetric round loop of one worker. Every worker executes the
/// same sequence of steps, meeting its peers once per round in
/// [`Collective::min_loc`].
pub struct RoundDriver<'c, 'm, C: Collective> {
    collective: &'c C,
    state: WorkerState<'m>,
    rounds: usize,
    status: RoundState,
}

impl<'c, 'm, C: Collective> RoundDriver<'c, 'm, C> {
    pub fn new(collective: &'c C, state: WorkerState<'m>) -> Self {
        debug!(
            "Worker {}/{} starting with range {}",
            collective.rank(),
            collective.size(),
            state.range()
        );
        Self {
            collective,
            state,
            rounds: 0,
            status: RoundState::Running,
        }
    }

    pub fn status(&self) -> RoundState {
        self.status
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn state(&self) -> &WorkerState<'m> {
        &self.state
    }

    /// One round: local candidate, global reduction, settle, relax.
    /// Calling it after termination does nothing.
    pub fn step(&mut self) -> Result<RoundState, SsspError> {
        if self.status != RoundState::Running {
            return Ok(self.status);
        }

        if self.state.all_processed() {
            self.status = RoundState::Terminated(Termination::AllProcessed);
            return Ok(self.status);
        }

        let local = self.state.local_best_candidate();
        let winner = self.collective.min_loc(local)?;
        self.rounds += 1;

        let Some(vertex) = winner.vertex() else {
            debug!(
                "Round {}: no reachable candidate left, {} vertices settled",
                self.rounds,
                self.state.processed_count()
            );
            self.status = RoundState::Terminated(Termination::NoReachableCandidate);
            return Ok(self.status);
        };

        trace!(
            "Round {}: settling vertex {} at distance {}",
            self.rounds,
            vertex,
            winner.distance
        );
        self.state.mark_processed(vertex);
        self.state.relax(winner);

        Ok(self.status)
    }

    /// Steps until terminated and hands back this worker's local results
    pub fn run(mut self) -> Result<WorkerRun, SsspError> {
        let termination = loop {
            if let RoundState::Terminated(termination) = self.step()? {
                break termination;
            }
        };

        info!(
            "Worker {} finished after {} rounds ({:?})",
            self.collective.rank(),
            self.rounds,
            termination
        );

        let rank = self.collective.rank();
        let range = self.state.range();
        let (distances, predecessors, settled) = self.state.into_parts();

        Ok(WorkerRun {
            rank,
            range,
            distances,
            predecessors,
            settled,
            rounds: self.rounds,
            termination,
        })
    }
}
