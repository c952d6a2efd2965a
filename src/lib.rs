mod sssp;
pub use sssp::*;
use log::LevelFilter;
use mpi::{environment::Universe, topology::SimpleCommunicator, traits::Communicator};

pub mod config;

mod logger;
pub use logger::set_worker;

/// Initializes MPI and Logging
pub fn init(level: Option<LevelFilter>) -> anyhow::Result<(Universe, SimpleCommunicator)> {
    let universe = mpi::initialize().ok_or(anyhow::anyhow!("MPI Not Initialized"))?;
    let world = universe.world();

    logger::init(world.rank() as usize, level);

    Ok((universe, world))
}

/// Initializes Logging for runs that stay inside this process
pub fn init_local(level: Option<LevelFilter>) {
    logger::init(0, level);
}
