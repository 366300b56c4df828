//! Graph Construction
//!
//! Step 1.2: The Map Maker
//!
//! Tokens are nodes, quotes are directed edges. Node and edge indices are
//! handed out densely in insertion order and never renumbered, so the brain
//! can refer to them by plain `usize`.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, info};

use super::MarketQuote;

/// Weight given to quotes whose effective rate is not positive.
///
/// Large enough that no cycle containing such an edge can sum below zero.
pub const INVALID_EDGE_WEIGHT: f64 = 1e9;

/// A single venue-specific quote from one token to another
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// Units of `to` received per unit of `from`
    pub rate: f64,
    /// Proportional fee (0.001 = 0.1%)
    pub fee: f64,
    /// Available depth on the venue
    pub liquidity: f64,
    /// Venue label
    pub exchange: String,
}

impl Edge {
    /// Rate after fees
    pub fn effective_rate(&self) -> f64 {
        self.rate * (1.0 - self.fee)
    }

    /// Log-space cost: `-ln(rate * (1 - fee))`
    ///
    /// A product of rates above 1 becomes a sum of weights below 0.
    pub fn get_weight(&self) -> f64 {
        let effective = self.effective_rate();
        if effective <= 0.0 || !effective.is_finite() {
            return INVALID_EDGE_WEIGHT;
        }
        -effective.ln()
    }
}

/// The quote graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<String>,
    node_indices: HashMap<String, usize>,
    edges: Vec<Edge>,
    adj_list: Vec<Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a market snapshot, one edge per quote
    pub fn from_quotes(quotes: &[MarketQuote]) -> Self {
        let mut graph = Self::new();

        for quote in quotes {
            graph.add_edge(
                &quote.from,
                &quote.to,
                quote.rate,
                quote.fee,
                quote.liquidity,
                &quote.exchange,
            );
        }

        let mut venue_counts: HashMap<&str, usize> = HashMap::new();
        for edge in &graph.edges {
            *venue_counts.entry(edge.exchange.as_str()).or_insert(0) += 1;
        }

        info!(
            "Graph built: {} Nodes, {} Edges",
            graph.node_count(),
            graph.edge_count()
        );
        for (venue, count) in &venue_counts {
            debug!("    {}: {} edges", venue, count);
        }

        graph
    }

    /// Register a token, returning its index. Repeated names keep their
    /// original index.
    pub fn add_node(&mut self, token: &str) -> usize {
        if let Some(&index) = self.node_indices.get(token) {
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(token.to_string());
        self.node_indices.insert(token.to_string(), index);
        self.adj_list.push(Vec::new());
        index
    }

    /// Add a quote. Unknown tokens are registered on the fly; values are
    /// stored as given, range policy belongs to the pruner.
    pub fn add_edge(
        &mut self,
        from_token: &str,
        to_token: &str,
        rate: f64,
        fee: f64,
        liquidity: f64,
        exchange: &str,
    ) {
        let from = self.add_node(from_token);
        let to = self.add_node(to_token);

        let edge_index = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            rate,
            fee,
            liquidity,
            exchange: exchange.to_string(),
        });
        self.adj_list[from].push(edge_index);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn get_node_index(&self, token: &str) -> Option<usize> {
        self.node_indices.get(token).copied()
    }

    /// Token symbol for `index`, or `""` when out of range
    pub fn get_node_name(&self, index: usize) -> &str {
        self.nodes.get(index).map(String::as_str).unwrap_or("")
    }

    /// Token symbols in index order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn get_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edge indices per token, in insertion order
    pub fn get_adjacency_list(&self) -> &[Vec<usize>] {
        &self.adj_list
    }

    /// Reset to empty. Every previously issued index is invalid afterwards.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_indices.clear();
        self.edges.clear();
        self.adj_list.clear();
    }

    /// Weighted petgraph view of the graph.
    ///
    /// Node and edge indices line up with ours since nothing is ever removed.
    pub fn to_digraph(&self) -> DiGraph<String, f64> {
        let mut digraph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());

        for token in &self.nodes {
            digraph.add_node(token.clone());
        }
        for edge in &self.edges {
            digraph.add_edge(
                NodeIndex::new(edge.from),
                NodeIndex::new(edge.to),
                edge.get_weight(),
            );
        }

        digraph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = Graph::new();

        let first = graph.add_node("BTC");
        let second = graph.add_node("BTC");

        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_indices_assigned_in_first_seen_order() {
        let mut graph = Graph::new();
        graph.add_edge("ETH", "USDT", 2500.0, 0.001, 50_000.0, "kraken");
        graph.add_edge("BTC", "ETH", 15.5, 0.001, 10_000.0, "binance");

        assert_eq!(graph.get_node_index("ETH"), Some(0));
        assert_eq!(graph.get_node_index("USDT"), Some(1));
        assert_eq!(graph.get_node_index("BTC"), Some(2));
        assert_eq!(graph.get_node_index("SOL"), None);
        assert_eq!(graph.get_node_name(2), "BTC");
        assert_eq!(graph.get_node_name(99), "");
    }

    #[test]
    fn test_adjacency_tracks_parallel_edges() {
        let mut graph = Graph::new();
        graph.add_edge("BTC", "ETH", 15.5, 0.001, 10_000.0, "binance");
        graph.add_edge("ETH", "BTC", 0.064, 0.001, 10_000.0, "binance");
        graph.add_edge("BTC", "ETH", 15.6, 0.002, 8_000.0, "coinbase");

        let adj = graph.get_adjacency_list();
        assert_eq!(adj[0], vec![0, 2]);
        assert_eq!(adj[1], vec![1]);
        assert_eq!(graph.get_edges()[2].exchange, "coinbase");
    }

    #[test]
    fn test_weight_formula() {
        let edge = Edge {
            from: 0,
            to: 1,
            rate: 2.0,
            fee: 0.5,
            liquidity: 0.0,
            exchange: String::new(),
        };
        assert!(edge.get_weight().abs() < 1e-12);

        let better = Edge { rate: 3.0, ..edge.clone() };
        assert!(better.get_weight() < edge.get_weight());
        assert!((better.get_weight() + 1.5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_rates_get_sentinel_weight() {
        let zero = Edge {
            from: 0,
            to: 1,
            rate: 0.0,
            fee: 0.0,
            liquidity: 0.0,
            exchange: String::new(),
        };
        assert_eq!(zero.get_weight(), INVALID_EDGE_WEIGHT);

        let full_fee = Edge { rate: 5.0, fee: 1.0, ..zero.clone() };
        assert_eq!(full_fee.get_weight(), INVALID_EDGE_WEIGHT);

        let negative = Edge { rate: -1.0, ..zero };
        assert_eq!(negative.get_weight(), INVALID_EDGE_WEIGHT);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut graph = Graph::new();
        graph.add_edge("A", "B", 1.0, 0.0, 1.0, "x");
        graph.clear();

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.get_adjacency_list().is_empty());
        assert_eq!(graph.get_node_index("A"), None);
        assert_eq!(graph.add_node("B"), 0);
    }

    #[test]
    fn test_digraph_view_matches_indices() {
        let mut graph = Graph::new();
        graph.add_edge("A", "B", 1.0, 0.0, 1.0, "x");
        graph.add_edge("B", "C", 2.0, 0.0, 1.0, "x");

        let digraph = graph.to_digraph();
        assert_eq!(digraph.node_count(), 3);
        assert_eq!(digraph.edge_count(), 2);
        assert_eq!(digraph[petgraph::graph::NodeIndex::new(2)], "C");
        let weight = digraph[petgraph::graph::EdgeIndex::new(1)];
        assert!((weight + 2.0f64.ln()).abs() < 1e-12);
    }
}
