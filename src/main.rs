use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use distributed_dijkstra::config::{Mode, RunConfig};
use distributed_dijkstra::{mpicommlayer, serial, threaded, AdjacencyMatrix, GlobalResult};

use anyhow::Context;
use clap::Parser;
use log::info;

fn main() -> anyhow::Result<()> {
    let started = Instant::now();
    let config = RunConfig::parse();

    match config.mode {
        Mode::Mpi => run_mpi(&config, started),
        Mode::Serial | Mode::Threads => run_local(&config, started),
    }
}

fn run_mpi(config: &RunConfig, started: Instant) -> anyhow::Result<()> {
    let (_universe, world) = distributed_dijkstra::init(config.log_level())?;

    // setup covers loading and distributing the matrix
    let (result, algorithm_started) =
        mpicommlayer::shortest_paths_timed(&world, config.source, || {
            AdjacencyMatrix::from_file(&config.input)
        })?;

    // only the root holds the assembled result
    if let Some(result) = result {
        finish(config, &result, started, algorithm_started)?;
    }

    Ok(())
}

fn run_local(config: &RunConfig, started: Instant) -> anyhow::Result<()> {
    distributed_dijkstra::init_local(config.log_level());

    let graph = AdjacencyMatrix::from_file(&config.input)?;

    let algorithm_started = Instant::now();
    let result = match config.mode {
        Mode::Threads => threaded::shortest_paths(&graph, config.source, config.workers)?,
        _ => serial::shortest_paths(&graph, config.source)?,
    };
    drop(graph);

    finish(config, &result, started, algorithm_started)
}

fn finish(
    config: &RunConfig,
    result: &GlobalResult,
    started: Instant,
    algorithm_started: Instant,
) -> anyhow::Result<()> {
    let printing_started = Instant::now();
    info!(
        "Finished after {} rounds ({:?})",
        result.rounds(),
        result.termination()
    );

    let path = config.output_path();
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    result.write_report(&mut out)?;
    out.flush()?;
    info!("Results written to {}", path.display());

    let finished = Instant::now();
    info!(
        "Total elapsed time: {}s",
        (finished - started).as_secs_f64()
    );
    info!(
        "Setup took: {}s",
        (algorithm_started - started).as_secs_f64()
    );
    info!(
        "Algorithm took: {}s",
        (printing_started - algorithm_started).as_secs_f64()
    );
    info!(
        "Printing solution took: {}s",
        (finished - printing_started).as_secs_f64()
    );

    Ok(())
}
