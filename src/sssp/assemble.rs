use std::io::Write;

use super::{PartitionPlan, SsspError, Termination, VertexID, WorkerRun, NO_PREDECESSOR};

use log::{debug, error};

/// Places every worker's local arrays into global arrays at the offsets of
/// the partition plan
pub struct ResultAssembler<'p> {
    plan: &'p PartitionPlan,
    distances: Vec<f64>,
    predecessors: Vec<i64>,
    placed: Vec<bool>,
}

impl<'p> ResultAssembler<'p> {
    pub fn new(plan: &'p PartitionPlan) -> Self {
        let n = plan.vertex_count();
        Self {
            plan,
            distances: vec![f64::INFINITY; n],
            predecessors: vec![NO_PREDECESSOR; n],
            placed: vec![false; plan.worker_count()],
        }
    }

    /// Copies `rank`'s contribution to its displacement. Both slices must be
    /// exactly as long as the rank's range; idle ranks contribute nothing.
    pub fn place(
        &mut self,
        rank: usize,
        distances: &[f64],
        predecessors: &[i64],
    ) -> Result<(), SsspError> {
        let expected = self.plan.sizes()[rank];
        for actual in [distances.len(), predecessors.len()] {
            if actual != expected {
                let err = SsspError::ContributionMismatch {
                    rank,
                    expected,
                    actual,
                };
                error!("{}", err);
                return Err(err);
            }
        }

        let start = self.plan.displacements()[rank];
        self.distances[start..start + expected].copy_from_slice(distances);
        self.predecessors[start..start + expected].copy_from_slice(predecessors);
        self.placed[rank] = true;

        debug!("Placed {} values from rank {} at {}", expected, rank, start);
        Ok(())
    }

    /// Global buffers for a transport that already places every rank's data
    /// at its displacement (MPI gatherv). Counts as a contribution from all ranks.
    pub(crate) fn gather_targets(&mut self) -> (&mut [f64], &mut [i64]) {
        self.placed.iter_mut().for_each(|p| *p = true);
        (&mut self.distances[..], &mut self.predecessors[..])
    }

    pub fn finish(
        self,
        source: VertexID,
        termination: Termination,
        rounds: usize,
    ) -> Result<GlobalResult, SsspError> {
        if let Some(rank) = self
            .placed
            .iter()
            .zip(self.plan.sizes())
            .position(|(&placed, &size)| !placed && size > 0)
        {
            let err = SsspError::ContributionMismatch {
                rank,
                expected: self.plan.sizes()[rank],
                actual: 0,
            };
            error!("{}", err);
            return Err(err);
        }

        Ok(GlobalResult {
            source,
            distances: self.distances,
            predecessors: self.predecessors,
            termination,
            rounds,
        })
    }
}

/// Assemble the outcome of workers that ran in this process
pub fn assemble(
    runs: &[WorkerRun],
    plan: &PartitionPlan,
    source: VertexID,
) -> Result<GlobalResult, SsspError> {
    let mut assembler = ResultAssembler::new(plan);
    for run in runs {
        assembler.place(run.rank, &run.distances, &run.predecessors)?;
    }

    // every worker sees the same sequence of winners
    let (termination, rounds) = runs
        .first()
        .map(|run| (run.termination, run.rounds))
        .ok_or(SsspError::NoWorkers)?;

    assembler.finish(source, termination, rounds)
}

/// Shortest-path distances and predecessor tree for every vertex
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalResult {
    source: VertexID,
    distances: Vec<f64>,
    predecessors: Vec<i64>,
    termination: Termination,
    rounds: usize,
}

impl GlobalResult {
    pub fn source(&self) -> VertexID {
        self.source
    }

    pub fn vertex_count(&self) -> usize {
        self.distances.len()
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// predecessor of every vertex, `-1` for the source and unreachable ones
    pub fn predecessors(&self) -> &[i64] {
        &self.predecessors
    }

    pub fn distance(&self, vertex: VertexID) -> f64 {
        self.distances[vertex.0]
    }

    pub fn predecessor(&self, vertex: VertexID) -> Option<VertexID> {
        usize::try_from(self.predecessors[vertex.0])
            .ok()
            .map(VertexID)
    }

    pub fn is_reachable(&self, vertex: VertexID) -> bool {
        self.distances[vertex.0].is_finite()
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Vertices from the source to `vertex`, `None` if it cannot be reached
    pub fn path_to(&self, vertex: VertexID) -> Option<Vec<VertexID>> {
        if !self.is_reachable(vertex) {
            return None;
        }

        let mut path = vec![vertex];
        let mut current = vertex;
        while let Some(previous) = self.predecessor(current) {
            // a predecessor chain never revisits a vertex
            if path.len() > self.vertex_count() {
                return None;
            }
            path.push(previous);
            current = previous;
        }

        path.reverse();
        Some(path)
    }

    /// Writes the distance table followed by one path per vertex
    pub fn write_report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "============ RESULTS ============")?;
        for (vertex, distance) in self.distances.iter().enumerate() {
            writeln!(
                out,
                "Distance from vertex {} to {}: {}",
                self.source, vertex, distance
            )?;
        }

        writeln!(out, "============ PATHS ============")?;
        for vertex in 0..self.vertex_count() {
            match self.path_to(VertexID(vertex)) {
                Some(path) => {
                    let path: Vec<String> = path.iter().map(ToString::to_string).collect();
                    writeln!(out, "{}", path.join(", "))?;
                }
                None => writeln!(out, "{}: unreachable", vertex)?,
            }
        }

        Ok(())
    }
}
