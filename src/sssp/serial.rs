use std::borrow::Cow;

use super::{
    validate_run, AdjacencyMatrix, GlobalResult, PartitionPlan, ResultAssembler, RoundDriver,
    SingleWorker, SsspError, VertexID, WorkerState,
};

use log::info;

/// Non-distributed baseline: one worker owning every vertex
pub fn shortest_paths(graph: &AdjacencyMatrix, source: usize) -> Result<GlobalResult, SsspError> {
    validate_run(graph.vertex_count(), source)?;
    info!(
        "Running serial shortest paths from {} over {} vertices",
        source,
        graph.vertex_count()
    );

    let plan = PartitionPlan::new(graph.vertex_count(), 1);
    let state = WorkerState::new(
        plan.range_of(0),
        graph.vertex_count(),
        source,
        Cow::Borrowed(graph.as_column_major()),
    )?;
    let run = RoundDriver::new(&SingleWorker, state).run()?;

    let mut assembler = ResultAssembler::new(&plan);
    assembler.place(0, &run.distances, &run.predecessors)?;
    assembler.finish(VertexID(source), run.termination, run.rounds)
}
