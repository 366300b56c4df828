//! Property tests for cycle detection
//!
//! These hold for any quote graph, regardless of the rates drawn.

use petgraph::algo::find_negative_cycle;
use petgraph::graph::NodeIndex;
use proptest::prelude::*;
use std::collections::HashSet;

use cycle_sniper::brain::CycleDetector;
use cycle_sniper::cartographer::Graph;

/// Random quotes between up to `max_nodes` tokens, one per ordered pair
fn quote_graph(
    max_nodes: usize,
    rates: std::ops::Range<f64>,
) -> impl Strategy<Value = Graph> {
    (2..=max_nodes).prop_flat_map(move |n| {
        prop::collection::vec((0..n, 0..n, rates.clone(), 0.0..0.01f64), 1..(n * n))
            .prop_map(|quotes| {
                let mut graph = Graph::new();
                let mut pairs = HashSet::new();
                for (from, to, rate, fee) in quotes {
                    if pairs.insert((from, to)) {
                        graph.add_edge(&format!("T{}", from), &format!("T{}", to), rate, fee, 1.0, "x");
                    }
                }
                graph
            })
    })
}

proptest! {
    #[test]
    fn prop_no_cycles_when_every_quote_loses(graph in quote_graph(8, 0.1..1.0)) {
        let report = CycleDetector::new().detect(&graph, 10);
        prop_assert!(report.cycles.is_empty());
    }

    #[test]
    fn prop_cycles_are_closed_and_capped(graph in quote_graph(7, 0.5..2.0), cap in 0usize..4) {
        let report = CycleDetector::new().detect(&graph, cap);

        prop_assert!(report.cycles.len() <= cap);
        prop_assert_eq!(report.metrics.cycles_found, report.cycles.len());

        let mut keys = HashSet::new();
        for cycle in &report.cycles {
            prop_assert!(!cycle.truncated);
            prop_assert_eq!(cycle.path.first(), cycle.path.last());
            prop_assert_eq!(cycle.path.len(), cycle.path_length + 1);
            prop_assert_eq!(cycle.edge_indices.len(), cycle.path_length);
            prop_assert!(cycle.log_profit < 1e-9);

            let mut key: Vec<&String> = cycle.path[..cycle.path_length].iter().collect();
            key.sort();
            prop_assert!(keys.insert(key));
        }
    }

    #[test]
    fn prop_agrees_with_petgraph(graph in quote_graph(6, 0.5..2.0)) {
        let digraph = graph.to_digraph();
        let oracle = (0..graph.node_count())
            .any(|s| find_negative_cycle(&digraph, NodeIndex::new(s)).is_some());

        let report = CycleDetector::new().detect(&graph, usize::MAX);
        prop_assert_eq!(!report.cycles.is_empty(), oracle);
    }
}
