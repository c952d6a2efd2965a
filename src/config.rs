//! Command line configuration of a run

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// How the workers are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// single process, no partitioning
    Serial,
    /// one worker per MPI rank (launch with mpirun)
    Mpi,
    /// several workers on threads of this process
    Threads,
}

impl Mode {
    fn default_output(&self) -> &'static str {
        match self {
            Mode::Serial => "resultsSerial.txt",
            Mode::Mpi => "resultsMPI.txt",
            Mode::Threads => "resultsThreads.txt",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "mpi-dijkstra",
    version,
    about = "Single-source shortest paths over a dense weighted graph"
)]
pub struct RunConfig {
    /// Index of the source vertex
    pub source: usize,

    /// Adjacency matrix file: vertex count followed by the weights row by row
    #[arg(default_value = "data/graph.dat")]
    pub input: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Mode::Mpi)]
    pub mode: Mode,

    /// Worker count for the threads mode
    #[arg(short, long, default_value_t = 4)]
    pub workers: usize,

    /// Where the report is written, defaults to results<Mode>.txt
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overrides RUST_LOG
    #[arg(long)]
    pub log_level: Option<LevelFilter>,

    /// Disable logging
    #[arg(short, long)]
    pub quiet: bool,
}

impl RunConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.mode.default_output()))
    }

    pub fn log_level(&self) -> Option<LevelFilter> {
        if self.quiet {
            Some(LevelFilter::Off)
        } else {
            self.log_level
        }
    }
}
