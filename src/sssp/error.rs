use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the adjacency matrix
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("graph source {} could not be opened: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed graph data: {0}")]
    Malformed(String),
}

/// Everything that can stop a shortest-path run before or during the round loop.
///
/// Running out of reachable vertices is not in here, see [`crate::Termination`].
#[derive(Error, Debug)]
pub enum SsspError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("No vertices to process")]
    EmptyGraph,

    #[error("Source vertex {vertex} is not valid for a graph with {vertex_count} vertices")]
    InvalidSource { vertex: usize, vertex_count: usize },

    #[error("At least one worker is required")]
    NoWorkers,

    #[error("Matrix slice holds {actual} weights, expected {expected}")]
    SliceMismatch { expected: usize, actual: usize },

    #[error("Worker {rank} contributed {actual} values, expected {expected}")]
    ContributionMismatch {
        rank: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Collective exchange failed: {0}")]
    Transport(String),
}
