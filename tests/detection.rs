//! End-to-end detection checks against the public API

use petgraph::algo::find_negative_cycle;
use petgraph::graph::NodeIndex;

use cycle_sniper::brain::{CycleDetector, EdgePruner, PruningConfig, DEFAULT_MAX_CYCLES};
use cycle_sniper::cartographer::{synthetic_quotes, Graph, MarketQuote, SyntheticMarket};

fn quote(from: &str, to: &str, rate: f64, fee: f64, liquidity: f64, exchange: &str) -> MarketQuote {
    MarketQuote {
        from: from.to_string(),
        to: to.to_string(),
        rate,
        fee,
        liquidity,
        exchange: exchange.to_string(),
    }
}

fn oracle_has_negative_cycle(graph: &Graph) -> bool {
    let digraph = graph.to_digraph();
    (0..graph.node_count()).any(|s| find_negative_cycle(&digraph, NodeIndex::new(s)).is_some())
}

#[test]
fn test_btc_eth_usdt_triangle() {
    // BTC -> ETH -> USDT -> BTC with a mispriced last leg
    let quotes = vec![
        quote("BTC", "ETH", 15.5, 0.001, 10_000.0, "binance"),
        quote("ETH", "USDT", 2500.0, 0.001, 50_000.0, "coinbase"),
        quote("USDT", "BTC", 0.000027, 0.001, 100_000.0, "kraken"),
    ];
    let graph = Graph::from_quotes(&quotes);

    let mut detector = CycleDetector::new();
    let cycles = detector.detect_arbitrage(&graph, DEFAULT_MAX_CYCLES);

    assert_eq!(cycles.len(), 1);
    let expected = 15.5 * 2500.0 * 0.000027 * 0.999f64.powi(3) - 1.0;
    assert!((cycles[0].raw_profit - expected).abs() < 1e-9);
    assert!(cycles[0].log_profit < 0.0);
    assert_eq!(cycles[0].exchanges.len(), 3);
    assert!(oracle_has_negative_cycle(&graph));
}

#[test]
fn test_fair_market_has_no_cycles() {
    let quotes = vec![
        quote("BTC", "ETH", 15.5, 0.001, 10_000.0, "binance"),
        quote("ETH", "USDT", 2500.0, 0.001, 50_000.0, "coinbase"),
        quote("USDT", "BTC", 1.0 / (15.5 * 2500.0), 0.001, 100_000.0, "kraken"),
    ];
    let graph = Graph::from_quotes(&quotes);

    assert!(CycleDetector::new().detect(&graph, 10).cycles.is_empty());
    assert!(!oracle_has_negative_cycle(&graph));
}

#[test]
fn test_synthetic_market_without_plant_is_clean() {
    let graph = Graph::from_quotes(&synthetic_quotes(&SyntheticMarket::default()));

    let report = CycleDetector::new().detect(&graph, 10);
    assert!(report.cycles.is_empty());
    assert_eq!(report.metrics.sources_scanned, graph.node_count());
}

#[test]
fn test_planted_arbitrage_is_found() {
    let market = SyntheticMarket {
        planted_edge: Some(0.05),
        ..Default::default()
    };
    let graph = Graph::from_quotes(&synthetic_quotes(&market));

    let report = CycleDetector::new().detect(&graph, 10);
    assert!(!report.cycles.is_empty());
    assert!(report.cycles.iter().all(|c| c.path.first() == c.path.last()));
    assert!(oracle_has_negative_cycle(&graph));
}

#[test]
fn test_pruning_policy_then_detection() {
    // The profitable leg sits on a thin venue
    let quotes = vec![
        quote("A", "B", 1.0, 0.0, 10_000.0, "deep"),
        quote("B", "C", 1.0, 0.0, 10_000.0, "deep"),
        quote("C", "A", 1.02, 0.0, 50.0, "thin"),
        quote("C", "A", 0.99, 0.0, 10_000.0, "deep"),
    ];
    let graph = Graph::from_quotes(&quotes);

    let mut pruner = EdgePruner::new(PruningConfig::default());
    assert_eq!(pruner.prune_edges(&graph), 1);
    assert_eq!(graph.edge_count(), 4);

    let detector = CycleDetector::new();
    assert_eq!(detector.detect(&graph, 10).cycles.len(), 1);

    let pruned = pruner.prune_graph(&graph);
    assert_eq!(pruned.edge_count(), 3);
    assert!(detector.detect(&pruned, 10).cycles.is_empty());
}

#[test]
fn test_metrics_follow_latest_call() {
    let mut graph = Graph::new();
    graph.add_edge("A", "B", 1.0, 0.0, 1.0, "x");
    graph.add_edge("B", "A", 1.1, 0.0, 1.0, "x");

    let mut detector = CycleDetector::new();
    detector.detect_arbitrage(&graph, 10);
    assert_eq!(detector.get_metrics().cycles_found, 1);

    detector.detect_arbitrage(&Graph::new(), 10);
    assert_eq!(detector.get_metrics().cycles_found, 0);
    assert_eq!(detector.get_metrics().graph_edges, 0);
}
