use super::{Candidate, SsspError};

/// The one collective the round loop depends on.
///
/// Implementations: [`SingleWorker`] (no peers), `MpiCollective` (rsmpi
/// communicator) and `ThreadedCollective` (workers inside one process).
pub trait Collective {
    /// this worker's rank
    fn rank(&self) -> usize;

    /// number of workers taking part in every reduction
    fn size(&self) -> usize;

    /// Global MIN-with-location over every worker's candidate. Blocks until
    /// all workers contributed; every worker receives the identical winner.
    fn min_loc(&self, local: Candidate) -> Result<Candidate, SsspError>;
}

/// Transport for a lone worker: the local candidate is the global one
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleWorker;

impl Collective for SingleWorker {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn min_loc(&self, local: Candidate) -> Result<Candidate, SsspError> {
        Ok(local)
    }
}

/// Fold a full set of candidates into the winner every worker must agree on
pub fn reduce_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Candidate {
    candidates
        .into_iter()
        .fold(Candidate::NONE, Candidate::better_of)
}
