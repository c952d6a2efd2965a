mod assemble;
mod collective;
mod driver;
mod error;
mod graph;
mod partition;
mod worker;

pub mod mpicommlayer;
pub mod serial;
pub mod threaded;

pub use assemble::*;
pub use collective::*;
pub use driver::*;
pub use error::*;
pub use graph::*;
pub use partition::*;
pub use worker::*;

pub use mpicommlayer::MpiCollective;
pub use threaded::{ThreadExchange, ThreadedCollective};

// Helper functions

/// Given a list of counts, create a list of displacements
fn displs_from_counts<T>(counts: &[T]) -> Vec<T>
where
    T: Copy + Default + std::ops::AddAssign,
{
    counts
        .iter()
        .scan(T::default(), |acc, &x| {
            let tmp = *acc;
            *acc += x;
            Some(tmp)
        })
        .collect()
}
