use std::borrow::Cow;

use indexmap::IndexSet;

use super::{SsspError, VertexID, VertexRange};

use mpi::traits::Equivalence;

use log::{debug, trace};

/// Wire value of "no vertex"
pub const NO_VERTEX: i64 = -1;

/// Predecessor of the source and of every unreachable vertex
pub const NO_PREDECESSOR: i64 = NO_VERTEX;

/// A worker's proposal for the next vertex to settle.
///
/// Kept as plain `f64`/`i64` so it travels as a single MPI datatype.
#[derive(Debug, Clone, Copy, PartialEq, Equivalence)]
pub struct Candidate {
    pub distance: f64,
    pub vertex: i64,
}

impl Candidate {
    /// Sentinel for a worker with nothing left to propose
    pub const NONE: Self = Self {
        distance: f64::INFINITY,
        vertex: NO_VERTEX,
    };

    pub fn new(distance: f64, vertex: VertexID) -> Self {
        Self {
            distance,
            vertex: vertex.0 as i64,
        }
    }

    pub fn vertex(&self) -> Option<VertexID> {
        usize::try_from(self.vertex).ok().map(VertexID)
    }

    pub fn is_none(&self) -> bool {
        self.vertex < 0
    }

    /// MIN-with-location: the smaller distance wins, equal distances go to
    /// the lower vertex index, and [`Candidate::NONE`] loses to anything.
    /// Every transport folds with this so all workers agree on the winner.
    pub fn better_of(self, other: Self) -> Self {
        match (self.is_none(), other.is_none()) {
            (true, _) => other,
            (_, true) => self,
            _ => match self.distance.total_cmp(&other.distance) {
                std::cmp::Ordering::Less => self,
                std::cmp::Ordering::Greater => other,
                std::cmp::Ordering::Equal if self.vertex <= other.vertex => self,
                std::cmp::Ordering::Equal => other,
            },
        }
    }
}

impl Default for Candidate {
    fn default() -> Self {
        Self::NONE
    }
}

/// Algorithm state of one worker: tentative distances and predecessors of
/// the owned vertices plus a replica of the globally settled set.
///
/// `columns` holds only the owned columns of the adjacency matrix, so
/// `columns[local * n + u]` is the weight of edge `u -> range.first() + local`.
#[derive(Debug)]
pub struct WorkerState<'m> {
    range: VertexRange,
    vertex_count: usize,
    columns: Cow<'m, [f64]>,
    distances: Vec<f64>,
    predecessors: Vec<i64>,
    processed: IndexSet<VertexID>,
}

impl<'m> WorkerState<'m> {
    pub fn new(
        range: VertexRange,
        vertex_count: usize,
        source: usize,
        columns: Cow<'m, [f64]>,
    ) -> Result<Self, SsspError> {
        let expected = range.len() * vertex_count;
        if columns.len() != expected {
            return Err(SsspError::SliceMismatch {
                expected,
                actual: columns.len(),
            });
        }

        let mut distances = vec![f64::INFINITY; range.len()];
        if let Some(local) = range.to_local(source) {
            debug!("Owns source vertex {}", source);
            distances[local] = 0.0;
        }

        Ok(Self {
            range,
            vertex_count,
            columns,
            distances,
            predecessors: vec![NO_PREDECESSOR; range.len()],
            processed: IndexSet::with_capacity(vertex_count),
        })
    }

    pub fn range(&self) -> VertexRange {
        self.range
    }

    /// Closest unsettled owned vertex, or [`Candidate::NONE`]
    pub fn local_best_candidate(&self) -> Candidate {
        self.range
            .vertices()
            .zip(&self.distances)
            .filter(|(vertex, _)| !self.is_processed(VertexID(*vertex)))
            .fold(Candidate::NONE, |best, (vertex, &distance)| {
                // strict comparison keeps the lowest index among equals
                if distance < best.distance {
                    Candidate::new(distance, VertexID(vertex))
                } else {
                    best
                }
            })
    }

    /// Adds `vertex` to the settled set, returns false if it was already there
    pub fn mark_processed(&mut self, vertex: VertexID) -> bool {
        self.processed.insert(vertex)
    }

    pub fn is_processed(&self, vertex: VertexID) -> bool {
        self.processed.contains(&vertex)
    }

    /// Relax every unsettled owned vertex against the round's winner.
    /// Returns how many tentative distances improved.
    pub fn relax(&mut self, winner: Candidate) -> usize {
        let Some(settled) = winner.vertex() else {
            return 0;
        };

        let n = self.vertex_count;
        let mut improved = 0;

        for (local, vertex) in self.range.vertices().enumerate() {
            if self.is_processed(VertexID(vertex)) {
                continue;
            }

            let candidate = winner.distance + self.columns[local * n + settled.0];
            if candidate < self.distances[local] {
                trace!(
                    "Vertex {} improved {} -> {} through {}",
                    vertex,
                    self.distances[local],
                    candidate,
                    settled
                );
                self.distances[local] = candidate;
                self.predecessors[local] = winner.vertex;
                improved += 1;
            }
        }

        improved
    }

    /// True once the whole graph is settled, not just this worker's range
    pub fn all_processed(&self) -> bool {
        self.processed.len() == self.vertex_count
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn predecessors(&self) -> &[i64] {
        &self.predecessors
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<f64>, Vec<i64>, Vec<VertexID>) {
        (
            self.distances,
            self.predecessors,
            self.processed.into_iter().collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AdjacencyMatrix, PartitionPlan};

    /// 0->1 (1), 1->2 (2), 0->2 (5), 2->3 (1)
    fn chain() -> AdjacencyMatrix {
        AdjacencyMatrix::from_edges(4, &[(0, 1, 1.0), (1, 2, 2.0), (0, 2, 5.0), (2, 3, 1.0)])
            .unwrap()
    }

    fn state_for(graph: &AdjacencyMatrix, plan: &PartitionPlan, rank: usize) -> WorkerState<'_> {
        let range = plan.range_of(rank);
        WorkerState::new(
            range,
            graph.vertex_count(),
            0,
            Cow::Borrowed(graph.columns(range)),
        )
        .unwrap()
    }

    #[test]
    fn test_candidate_ordering() {
        let a = Candidate::new(1.0, VertexID(3));
        let b = Candidate::new(2.0, VertexID(1));
        let tie = Candidate::new(1.0, VertexID(2));

        assert_eq!(a.better_of(b), a);
        assert_eq!(b.better_of(a), a);
        assert_eq!(a.better_of(tie), tie);
        assert_eq!(tie.better_of(a), tie);
        assert_eq!(Candidate::NONE.better_of(b), b);
        assert_eq!(b.better_of(Candidate::NONE), b);
        assert!(Candidate::NONE.better_of(Candidate::NONE).is_none());
        assert_eq!(Candidate::NONE.vertex(), None);
        assert_eq!(a.vertex(), Some(VertexID(3)));
    }

    #[test]
    fn test_source_initialized_only_by_owner() {
        let graph = chain();
        let plan = PartitionPlan::new(4, 2);

        let owner = state_for(&graph, &plan, 0);
        assert_eq!(owner.distances(), &[0.0, f64::INFINITY]);

        let other = state_for(&graph, &plan, 1);
        assert!(other.distances().iter().all(|d| d.is_infinite()));
        assert!(other.local_best_candidate().is_none());
        assert!(other.predecessors().iter().all(|&p| p == NO_PREDECESSOR));
    }

    #[test]
    fn test_local_best_skips_processed() {
        let graph = chain();
        let plan = PartitionPlan::new(4, 1);
        let mut state = state_for(&graph, &plan, 0);

        assert_eq!(state.local_best_candidate(), Candidate::new(0.0, VertexID(0)));

        state.mark_processed(VertexID(0));
        state.relax(Candidate::new(0.0, VertexID(0)));
        assert_eq!(state.local_best_candidate(), Candidate::new(1.0, VertexID(1)));
    }

    #[test]
    fn test_mark_processed_idempotent() {
        let graph = chain();
        let plan = PartitionPlan::new(4, 1);
        let mut state = state_for(&graph, &plan, 0);

        assert!(state.mark_processed(VertexID(2)));
        assert!(!state.mark_processed(VertexID(2)));
        assert_eq!(state.processed_count(), 1);
        assert!(state.is_processed(VertexID(2)));
    }

    #[test]
    fn test_relax_uses_only_owned_columns() {
        let graph = chain();
        let plan = PartitionPlan::new(4, 2);
        let mut upper = state_for(&graph, &plan, 1);

        // rank 1 owns vertices 2 and 3; settling 0 only reaches 2
        upper.mark_processed(VertexID(0));
        assert_eq!(upper.relax(Candidate::new(0.0, VertexID(0))), 1);
        assert_eq!(upper.distances(), &[5.0, f64::INFINITY]);
        assert_eq!(upper.predecessors(), &[0, NO_PREDECESSOR]);

        // a shorter path through 1 replaces it
        upper.mark_processed(VertexID(1));
        assert_eq!(upper.relax(Candidate::new(1.0, VertexID(1))), 1);
        assert_eq!(upper.distances(), &[3.0, f64::INFINITY]);
        assert_eq!(upper.predecessors(), &[1, NO_PREDECESSOR]);
    }

    #[test]
    fn test_relax_skips_processed_vertices() {
        let graph = AdjacencyMatrix::from_edges(2, &[(0, 1, 1.0), (1, 0, 1.0)]).unwrap();
        let plan = PartitionPlan::new(2, 1);
        let mut state = state_for(&graph, &plan, 0);

        state.mark_processed(VertexID(0));
        state.relax(Candidate::new(0.0, VertexID(0)));
        state.mark_processed(VertexID(1));
        state.relax(Candidate::new(1.0, VertexID(1)));

        assert_eq!(state.distances(), &[0.0, 1.0]);
        assert_eq!(state.predecessors(), &[NO_PREDECESSOR, 0]);
    }

    #[test]
    fn test_empty_range_is_noop() {
        let graph = chain();
        let plan = PartitionPlan::new(4, 6);
        let mut idle = state_for(&graph, &plan, 5);

        assert!(idle.range().is_empty());
        assert!(idle.local_best_candidate().is_none());
        assert_eq!(idle.relax(Candidate::new(0.0, VertexID(0))), 0);
        assert!(idle.distances().is_empty());
    }

    #[test]
    fn test_all_processed_counts_global_vertices() {
        let graph = chain();
        let plan = PartitionPlan::new(4, 4);
        let mut state = state_for(&graph, &plan, 3);

        for v in 0..3 {
            state.mark_processed(VertexID(v));
            assert!(!state.all_processed());
        }
        state.mark_processed(VertexID(3));
        assert!(state.all_processed());
    }

    #[test]
    fn test_slice_mismatch() {
        let err = WorkerState::new(VertexRange::new(0, 2), 4, 0, Cow::Owned(vec![0.0; 7]))
            .unwrap_err();
        assert!(matches!(
            err,
            SsspError::SliceMismatch {
                expected: 8,
                actual: 7
            }
        ));
    }
}
