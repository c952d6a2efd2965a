use std::path::Path;

use super::{LoadError, VertexRange};

use log::{debug, error, info};

use mpi::traits::Equivalence;

/// Matrix entries below this value are read from files as "no edge"
pub const NO_EDGE_THRESHOLD: f64 = 0.001;

/// Stored weight of an absent edge
pub const NO_EDGE: f64 = f64::INFINITY;

/// Newtype to represent vertex ids
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Equivalence, PartialOrd, Ord, Hash)]
pub struct VertexID(pub usize);

impl From<usize> for VertexID {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for VertexID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense weighted adjacency matrix of a directed graph.
///
/// Weights are kept column by column: every weight of an edge *entering*
/// vertex `j` lives in `data[j * n..(j + 1) * n]`, indexed by the edge's
/// source vertex. Absent edges hold [`NO_EDGE`], so a genuine zero-weight
/// edge stays distinguishable from a missing one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdjacencyMatrix {
    vertex_count: usize,
    data: Vec<f64>,
}

impl AdjacencyMatrix {
    /// Reads the matrix from a text file, see [`AdjacencyMatrix::parse`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("Loading adjacency matrix from {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|source| {
            let err = LoadError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            };
            error!("{}", err);
            err
        })?;

        let matrix = Self::parse(&text)?;
        info!(
            "Loaded adjacency matrix with {} vertices",
            matrix.vertex_count
        );
        Ok(matrix)
    }

    /// Parses `n` followed by `n * n` whitespace separated weights, row `i`
    /// column `j` being the weight of edge `i -> j`. Values below
    /// [`NO_EDGE_THRESHOLD`] (and `inf`) mean there is no edge.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut tokens = text.split_whitespace();

        let vertex_count = tokens
            .next()
            .ok_or_else(|| LoadError::Malformed("missing vertex count".into()))?
            .parse::<usize>()
            .map_err(|e| LoadError::Malformed(format!("invalid vertex count: {e}")))?;

        let cells = vertex_count
            .checked_mul(vertex_count)
            .ok_or_else(|| LoadError::Malformed(format!("{vertex_count} vertices overflow")))?;

        // weights are collected before the matrix is allocated, so a header
        // claiming more vertices than the input holds fails as Malformed
        let mut weights = Vec::new();
        for (idx, token) in tokens.by_ref().take(cells).enumerate() {
            let (row, col) = (idx / vertex_count, idx % vertex_count);
            let value = token.parse::<f64>().map_err(|e| {
                LoadError::Malformed(format!("weight {token:?} at ({row}, {col}): {e}"))
            })?;
            if value.is_nan() {
                return Err(LoadError::Malformed(format!(
                    "weight at ({row}, {col}) is NaN"
                )));
            }
            weights.push(value);
        }

        if weights.len() < cells {
            return Err(LoadError::Malformed(format!(
                "expected {cells} weights, input ended at row {} column {}",
                weights.len() / vertex_count,
                weights.len() % vertex_count
            )));
        }

        let mut data = vec![NO_EDGE; cells];
        for (idx, &value) in weights.iter().enumerate() {
            let (row, col) = (idx / vertex_count, idx % vertex_count);
            if value >= NO_EDGE_THRESHOLD {
                data[col * vertex_count + row] = value;
            }
        }

        if tokens.next().is_some() {
            debug!("Ignoring trailing tokens after {} weights", cells);
        }

        Ok(Self { vertex_count, data })
    }

    /// Builds a matrix from rows where `rows[i][j]` is the weight of `i -> j`.
    /// Use [`NO_EDGE`] for missing edges; zero is kept as a real weight.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, LoadError> {
        let vertex_count = rows.len();
        let mut data = vec![NO_EDGE; vertex_count * vertex_count];

        for (row, weights) in rows.iter().enumerate() {
            if weights.len() != vertex_count {
                return Err(LoadError::Malformed(format!(
                    "row {row} has {} entries, expected {vertex_count}",
                    weights.len()
                )));
            }
            for (col, &weight) in weights.iter().enumerate() {
                if weight.is_nan() || weight < 0.0 {
                    return Err(LoadError::Malformed(format!(
                        "weight at ({row}, {col}) must be a non-negative number"
                    )));
                }
                data[col * vertex_count + row] = weight;
            }
        }

        Ok(Self { vertex_count, data })
    }

    /// Builds a matrix of `vertex_count` vertices from `(from, to, weight)` triples
    pub fn from_edges(
        vertex_count: usize,
        edges: &[(usize, usize, f64)],
    ) -> Result<Self, LoadError> {
        let mut data = vec![NO_EDGE; vertex_count * vertex_count];

        for &(from, to, weight) in edges {
            if from >= vertex_count || to >= vertex_count {
                return Err(LoadError::Malformed(format!(
                    "edge ({from}, {to}) out of range for {vertex_count} vertices"
                )));
            }
            if weight.is_nan() || weight < 0.0 {
                return Err(LoadError::Malformed(format!(
                    "edge ({from}, {to}) has invalid weight {weight}"
                )));
            }
            data[to * vertex_count + from] = weight;
        }

        Ok(Self { vertex_count, data })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Weight of edge `from -> to`, [`NO_EDGE`] if there is none.
    /// Panics when either index is out of range.
    pub fn weight(&self, from: usize, to: usize) -> f64 {
        assert!(
            from < self.vertex_count && to < self.vertex_count,
            "vertex ({}, {}) out of range for {} vertices",
            from,
            to,
            self.vertex_count
        );
        self.data[to * self.vertex_count + from]
    }

    /// The whole matrix, column-major
    pub fn as_column_major(&self) -> &[f64] {
        &self.data
    }

    /// The contiguous block of columns owned by `range`
    pub fn columns(&self, range: VertexRange) -> &[f64] {
        let start = range.first() * self.vertex_count;
        &self.data[start..start + range.len() * self.vertex_count]
    }
}
