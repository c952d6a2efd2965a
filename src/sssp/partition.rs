use log::trace;

use super::displs_from_counts;

/// Contiguous block of vertices owned by one worker. May be empty when there
/// are more workers than vertices; an empty range still sits at a valid
/// position so every lookup on it is a no-op.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexRange {
    start: usize,
    len: usize,
}

impl VertexRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// First global vertex of the range. For an empty range this is where the
    /// range would begin.
    pub fn first(&self) -> usize {
        self.start
    }

    /// Last global vertex of the range, `None` if the range is empty
    pub fn last(&self) -> Option<usize> {
        (self.len > 0).then(|| self.start + self.len - 1)
    }

    /// Closed interval `[first, last]`, `None` for an idle worker
    pub fn bounds(&self) -> Option<(usize, usize)> {
        self.last().map(|last| (self.start, last))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, vertex: usize) -> bool {
        vertex >= self.start && vertex < self.start + self.len
    }

    /// global indices of the owned vertices
    pub fn vertices(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }

    /// Translate a global vertex into an index of the local arrays
    pub fn to_local(&self, vertex: usize) -> Option<usize> {
        self.contains(vertex).then(|| vertex - self.start)
    }
}

impl std::fmt::Display for VertexRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bounds() {
            Some((first, last)) => write!(f, "[{}, {}]", first, last),
            None => write!(f, "[] at {}", self.start),
        }
    }
}

/// Given the number of workers and the global number of vertices, compute how
/// many vertices every worker owns. The first `n % workers` ranks own one extra.
pub fn compute_sizes(vertex_count: usize, worker_count: usize) -> Vec<usize> {
    if worker_count == 0 {
        return Vec::new();
    }

    let per_worker = vertex_count / worker_count;
    let leftover = vertex_count % worker_count;

    (0..worker_count)
        .map(|rank| per_worker + usize::from(rank < leftover))
        .collect()
}

/// Exclusive prefix sum of `sizes`, every entry scaled by `stride`
pub fn compute_displacements(sizes: &[usize], stride: usize) -> Vec<usize> {
    let scaled: Vec<usize> = sizes.iter().map(|size| size * stride).collect();
    displs_from_counts(&scaled)
}

/// The range owned by `rank`, consistent with [`compute_sizes`]
pub fn compute_range(
    vertex_count: usize,
    worker_count: usize,
    rank: usize,
    own_size: usize,
) -> VertexRange {
    if worker_count == 0 {
        return VertexRange::new(0, 0);
    }

    let per_worker = vertex_count / worker_count;
    let leftover = vertex_count % worker_count;

    let start = rank * per_worker + std::cmp::min(rank, leftover);
    trace!("Rank {} owns {} vertices from {}", rank, own_size, start);
    VertexRange::new(start, own_size)
}

/// Static assignment of vertices to workers for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    vertex_count: usize,
    sizes: Vec<usize>,
    displacements: Vec<usize>,
}

impl PartitionPlan {
    pub fn new(vertex_count: usize, worker_count: usize) -> Self {
        let sizes = compute_sizes(vertex_count, worker_count);
        let displacements = compute_displacements(&sizes, 1);

        Self {
            vertex_count,
            sizes,
            displacements,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn worker_count(&self) -> usize {
        self.sizes.len()
    }

    /// vertices owned by each rank
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Offset of each rank's vertices inside a global per-vertex array
    pub fn displacements(&self) -> &[usize] {
        &self.displacements
    }

    /// Per-rank element counts when every vertex carries `stride` elements,
    /// e.g. `n` for matrix columns
    pub fn scaled_sizes(&self, stride: usize) -> Vec<usize> {
        self.sizes.iter().map(|size| size * stride).collect()
    }

    pub fn displacements_with_stride(&self, stride: usize) -> Vec<usize> {
        compute_displacements(&self.sizes, stride)
    }

    pub fn range_of(&self, rank: usize) -> VertexRange {
        compute_range(
            self.vertex_count,
            self.worker_count(),
            rank,
            self.sizes[rank],
        )
    }

    pub fn ranges(&self) -> impl Iterator<Item = VertexRange> + '_ {
        (0..self.worker_count()).map(|rank| self.range_of(rank))
    }

    /// Rank owning `vertex`, `None` if the vertex is outside the graph
    pub fn owner_of(&self, vertex: usize) -> Option<usize> {
        if vertex >= self.vertex_count {
            return None;
        }

        // last rank whose block starts at or before the vertex; empty ranks
        // share their start with the next non-empty one and are skipped
        let rank = self
            .displacements
            .partition_point(|&start| start <= vertex)
            .checked_sub(1)?;
        debug_assert!(self.range_of(rank).contains(vertex));
        Some(rank)
    }

}
