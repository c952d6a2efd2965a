use distributed_dijkstra::*;
use petgraph::graph::{DiGraph, NodeIndex};
use proptest::prelude::*;

/// dense graph as (n, row-major optional weights, source)
fn dense_graph() -> impl Strategy<Value = (usize, Vec<Option<u32>>, usize)> {
    (1usize..12).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec(
                prop_oneof![2 => Just(None), 1 => (1u32..20).prop_map(Some)],
                n * n,
            ),
            0..n,
        )
    })
}

fn build(n: usize, cells: &[Option<u32>]) -> AdjacencyMatrix {
    let edges: Vec<_> = cells
        .iter()
        .enumerate()
        .filter_map(|(idx, w)| w.map(|w| (idx / n, idx % n, f64::from(w))))
        .collect();
    AdjacencyMatrix::from_edges(n, &edges).unwrap()
}

fn reference_distances(n: usize, cells: &[Option<u32>], source: usize) -> Vec<f64> {
    let mut graph = DiGraph::<(), f64>::new();
    let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
    for (idx, w) in cells.iter().enumerate() {
        if let Some(w) = w {
            graph.add_edge(nodes[idx / n], nodes[idx % n], f64::from(*w));
        }
    }

    let found = petgraph::algo::dijkstra(&graph, NodeIndex::new(source), None, |e| *e.weight());
    (0..n)
        .map(|v| found.get(&NodeIndex::new(v)).copied().unwrap_or(f64::INFINITY))
        .collect()
}

proptest! {
    #[test]
    fn test_partition_tiles_vertices(n in 0usize..200, workers in 1usize..40) {
        let plan = PartitionPlan::new(n, workers);

        prop_assert_eq!(plan.sizes().iter().sum::<usize>(), n);
        prop_assert_eq!(plan.displacements()[0], 0);

        let mut next = 0;
        for range in plan.ranges() {
            prop_assert_eq!(range.first(), next);
            next += range.len();
        }
        prop_assert_eq!(next, n);

        for v in 0..n {
            let owner = plan.owner_of(v).unwrap();
            prop_assert!(plan.range_of(owner).contains(v));
            prop_assert_eq!(plan.ranges().filter(|r| r.contains(v)).count(), 1);
        }
    }

    #[test]
    fn test_surplus_workers_get_at_most_one(n in 0usize..20, extra in 1usize..20) {
        let sizes = compute_sizes(n, n + extra);

        prop_assert!(sizes.iter().all(|&s| s <= 1));
        prop_assert_eq!(sizes.iter().filter(|&&s| s == 1).count(), n);
    }

    #[test]
    fn test_matches_reference_dijkstra((n, cells, source) in dense_graph()) {
        let graph = build(n, &cells);
        let result = serial::shortest_paths(&graph, source).unwrap();

        prop_assert_eq!(result.distances(), &reference_distances(n, &cells, source)[..]);
        prop_assert!(result.rounds() <= n);

        for v in 0..n {
            let vertex = VertexID(v);
            match result.path_to(vertex) {
                Some(path) => {
                    prop_assert_eq!(path[0], VertexID(source));
                    let length: f64 = path.windows(2).map(|p| graph.weight(p[0].0, p[1].0)).sum();
                    prop_assert_eq!(length, result.distance(vertex));
                }
                None => prop_assert!(result.distance(vertex).is_infinite()),
            }
        }
    }

    #[test]
    fn test_worker_count_does_not_change_result(
        (n, cells, source) in dense_graph(),
        workers in 1usize..8,
    ) {
        let graph = build(n, &cells);
        let baseline = serial::shortest_paths(&graph, source).unwrap();
        let distributed = threaded::shortest_paths(&graph, source, workers).unwrap();

        prop_assert_eq!(distributed, baseline);
    }
}
