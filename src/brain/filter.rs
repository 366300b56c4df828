//! Edge Filter
//!
//! Step 2.0: The Filter
//!
//! Flags quotes that fail liquidity, fee or rate policy. Counting is the
//! default and never touches the graph; `prune_graph` is the separate,
//! explicit way to get a graph without the flagged quotes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cartographer::{Edge, Graph};

/// Threshold policy. Each rule is toggled independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruningConfig {
    /// Minimum liquidity a quote needs
    pub min_liquidity: f64,

    /// Maximum fee (0.05 = 5%)
    pub max_fee: f64,

    /// Lowest acceptable quoted rate
    pub min_rate: f64,

    /// Highest acceptable quoted rate
    pub max_rate: f64,

    pub enable_liquidity_pruning: bool,
    pub enable_fee_pruning: bool,
    pub enable_rate_pruning: bool,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            min_liquidity: 100.0,
            max_fee: 0.05,
            min_rate: 0.0001,
            max_rate: 1_000_000.0,
            enable_liquidity_pruning: true,
            enable_fee_pruning: true,
            enable_rate_pruning: true,
        }
    }
}

impl PruningConfig {
    /// A policy with every rule switched off
    pub fn disabled() -> Self {
        Self {
            enable_liquidity_pruning: false,
            enable_fee_pruning: false,
            enable_rate_pruning: false,
            ..Self::default()
        }
    }
}

/// Policy evaluator over graph edges
#[derive(Debug, Clone, Default)]
pub struct EdgePruner {
    config: PruningConfig,
    edges_removed: usize,
}

impl EdgePruner {
    pub fn new(config: PruningConfig) -> Self {
        Self {
            config,
            edges_removed: 0,
        }
    }

    pub fn set_config(&mut self, config: PruningConfig) {
        self.config = config;
    }

    pub fn get_config(&self) -> &PruningConfig {
        &self.config
    }

    /// Count produced by the most recent `prune_edges` / `prune_graph`
    pub fn get_edges_removed(&self) -> usize {
        self.edges_removed
    }

    /// True when any enabled rule rejects the edge
    pub fn should_prune(&self, edge: &Edge) -> bool {
        let config = &self.config;

        if config.enable_liquidity_pruning && edge.liquidity < config.min_liquidity {
            return true;
        }

        if config.enable_fee_pruning && edge.fee > config.max_fee {
            return true;
        }

        if config.enable_rate_pruning && (edge.rate < config.min_rate || edge.rate > config.max_rate)
        {
            return true;
        }

        false
    }

    /// Indices of every edge the current policy rejects
    pub fn prunable_edges(&self, graph: &Graph) -> Vec<usize> {
        graph
            .get_edges()
            .iter()
            .enumerate()
            .filter(|(_, edge)| self.should_prune(edge))
            .map(|(index, _)| index)
            .collect()
    }

    /// Count the edges the current policy would remove. The graph is not
    /// modified.
    pub fn prune_edges(&mut self, graph: &Graph) -> usize {
        self.edges_removed = graph
            .get_edges()
            .iter()
            .filter(|edge| self.should_prune(edge))
            .count();

        debug!(
            "{} of {} edges fail the pruning policy",
            self.edges_removed,
            graph.edge_count()
        );
        self.edges_removed
    }

    /// Build a new graph holding only the edges that pass the policy.
    ///
    /// Tokens are re-registered in their original order first, so token
    /// indices match the input graph even when a token loses every edge.
    /// Edge indices are renumbered densely.
    pub fn prune_graph(&mut self, graph: &Graph) -> Graph {
        let mut pruned = Graph::new();
        for token in graph.nodes() {
            pruned.add_node(token);
        }

        let mut removed = 0;
        for edge in graph.get_edges() {
            if self.should_prune(edge) {
                removed += 1;
                continue;
            }
            pruned.add_edge(
                graph.get_node_name(edge.from),
                graph.get_node_name(edge.to),
                edge.rate,
                edge.fee,
                edge.liquidity,
                &edge.exchange,
            );
        }
        self.edges_removed = removed;

        info!(
            "Pruned {} edges: {} -> {} remaining",
            removed,
            graph.edge_count(),
            pruned.edge_count()
        );
        pruned
    }
}
