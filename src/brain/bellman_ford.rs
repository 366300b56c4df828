//! Bellman-Ford Negative Cycle Detection
//!
//! Step 2.1: The Pathfinder
//!
//! With edge weights of `-ln(rate * (1 - fee))`, a round trip that multiplies
//! to more than 1 is a cycle whose weights sum below 0. Each source token gets
//! one relaxation pass; a still-relaxable edge afterwards means a negative
//! cycle is reachable, and the parent pointers lead into it.
//!
//! This is a capped, best-effort scan: at most one cycle per source, not an
//! enumeration of every negative cycle.

use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cartographer::Graph;

/// Default cap on cycles returned by one detection run
pub const DEFAULT_MAX_CYCLES: usize = 10;

/// Upper bound on nodes collected while closing a cycle
pub const MAX_CYCLE_NODES: usize = 100;

/// A profitable round trip found in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageCycle {
    /// Token symbols, first == last
    pub path: Vec<String>,
    /// Edge traversed for each hop
    pub edge_indices: Vec<usize>,
    /// Venue of each hop
    pub exchanges: Vec<String>,
    /// Net multiplicative return as a fraction (0.02 = +2%)
    pub raw_profit: f64,
    /// Sum of edge weights; negative for a real arbitrage
    pub log_profit: f64,
    pub path_length: usize,
    /// Even share of the run's total detection time
    pub detection_time_ms: f64,
    /// The walk hit `MAX_CYCLE_NODES` before closing
    pub truncated: bool,
}

impl ArbitrageCycle {
    pub fn expected_return(&self) -> f64 {
        1.0 + self.raw_profit
    }

    pub fn profit_percentage(&self) -> f64 {
        self.raw_profit * 100.0
    }

    pub fn hop_count(&self) -> usize {
        self.path_length
    }

    pub fn is_cross_venue(&self) -> bool {
        match self.exchanges.first() {
            Some(first) => self.exchanges.iter().any(|e| e != first),
            None => false,
        }
    }

    pub fn venue_path(&self) -> String {
        self.exchanges.join(" → ")
    }
}

/// Snapshot of one detection run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectionMetrics {
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub detection_time_ms: f64,
    pub cycles_found: usize,
    pub sources_scanned: usize,
    pub truncated_cycles: usize,
}

/// Cycles in discovery order plus the metrics of the run that found them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionReport {
    pub cycles: Vec<ArbitrageCycle>,
    pub metrics: DetectionMetrics,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Relax sources on the rayon pool. Output is identical to the
    /// sequential scan.
    pub parallel: bool,
}

/// Raw cycle as token indices, closed (first == last)
#[derive(Debug, Clone, PartialEq, Eq)]
struct CycleWalk {
    nodes: Vec<usize>,
    truncated: bool,
}

#[derive(Debug)]
pub struct CycleDetector {
    config: DetectorConfig,
    metrics: DetectionMetrics,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            config,
            metrics: DetectionMetrics::default(),
        }
    }

    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    /// Metrics of the last `detect_arbitrage` call
    pub fn get_metrics(&self) -> DetectionMetrics {
        self.metrics
    }

    /// Run detection and remember its metrics for `get_metrics`
    pub fn detect_arbitrage(&mut self, graph: &Graph, max_cycles: usize) -> Vec<ArbitrageCycle> {
        let report = self.detect(graph, max_cycles);
        self.metrics = report.metrics;
        report.cycles
    }

    /// Scan every source token in index order until `max_cycles` distinct
    /// cycles are collected or the sources run out.
    pub fn detect(&self, graph: &Graph, max_cycles: usize) -> DetectionReport {
        let start = Instant::now();

        let mut metrics = DetectionMetrics {
            graph_nodes: graph.node_count(),
            graph_edges: graph.edge_count(),
            ..Default::default()
        };
        let mut cycles = Vec::new();

        if graph.node_count() == 0 {
            metrics.detection_time_ms = start.elapsed().as_secs_f64() * 1000.0;
            return DetectionReport { cycles, metrics };
        }

        let weights: Vec<f64> = graph.get_edges().iter().map(|e| e.get_weight()).collect();
        let mut seen: HashSet<Vec<usize>> = HashSet::new();

        let batch = if self.config.parallel {
            rayon::current_num_threads().max(1)
        } else {
            1
        };
        let sources: Vec<usize> = (0..graph.node_count()).collect();

        'scan: for chunk in sources.chunks(batch) {
            if cycles.len() >= max_cycles {
                break;
            }

            let walks: Vec<Option<CycleWalk>> = if self.config.parallel {
                chunk
                    .par_iter()
                    .map(|&source| find_cycle_from(graph, &weights, source))
                    .collect()
            } else {
                chunk
                    .iter()
                    .map(|&source| find_cycle_from(graph, &weights, source))
                    .collect()
            };

            for (&source, walk) in chunk.iter().zip(walks) {
                if cycles.len() >= max_cycles {
                    break 'scan;
                }
                metrics.sources_scanned += 1;

                let Some(walk) = walk else {
                    continue;
                };

                let key = cycle_key(&walk.nodes);
                if !seen.insert(key) {
                    debug!("Source {}: duplicate cycle skipped", graph.get_node_name(source));
                    continue;
                }

                let cycle = build_cycle(graph, &weights, &walk);
                debug!(
                    "Source {}: {} ({:+.4}%)",
                    graph.get_node_name(source),
                    cycle.path.join(" → "),
                    cycle.profit_percentage()
                );
                if cycle.truncated {
                    warn!(
                        "Cycle from {} exceeded {} nodes and was truncated",
                        graph.get_node_name(source),
                        MAX_CYCLE_NODES
                    );
                    metrics.truncated_cycles += 1;
                }
                cycles.push(cycle);
            }
        }

        metrics.detection_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics.cycles_found = cycles.len();

        if !cycles.is_empty() {
            let share = metrics.detection_time_ms / cycles.len() as f64;
            for cycle in &mut cycles {
                cycle.detection_time_ms = share;
            }
        }

        info!(
            "Found {} cycles in {:.3}ms ({} nodes, {} edges, {} sources scanned)",
            metrics.cycles_found,
            metrics.detection_time_ms,
            metrics.graph_nodes,
            metrics.graph_edges,
            metrics.sources_scanned
        );

        DetectionReport { cycles, metrics }
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// One Bellman-Ford pass from `source`, returning the negative cycle it
/// exposes, if any.
fn find_cycle_from(graph: &Graph, weights: &[f64], source: usize) -> Option<CycleWalk> {
    let n = graph.node_count();
    let edges = graph.get_edges();

    let mut dist = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    dist[source] = 0.0;

    for _ in 1..n {
        let mut changed = false;
        for (edge, &weight) in edges.iter().zip(weights) {
            if !dist[edge.from].is_finite() {
                continue;
            }
            let candidate = dist[edge.from] + weight;
            if candidate < dist[edge.to] {
                dist[edge.to] = candidate;
                parent[edge.to] = Some(edge.from);
                changed = true;
            }
        }
        // Nothing moved, so nothing will: no negative cycle from here.
        if !changed {
            return None;
        }
    }

    let (edge, _) = edges.iter().zip(weights).find(|(edge, weight)| {
        dist[edge.from].is_finite() && dist[edge.from] + **weight < dist[edge.to]
    })?;

    walk_cycle(&parent, edge.to)
}

/// Follow parent pointers from `start` until a node repeats, then collect
/// the cycle through it in forward order. A chain that runs back to the
/// source (no parent) yields nothing.
fn walk_cycle(parent: &[Option<usize>], start: usize) -> Option<CycleWalk> {
    let mut visited = vec![false; parent.len()];
    let mut current = start;
    while !visited[current] {
        visited[current] = true;
        current = parent[current]?;
    }

    let anchor = current;
    let mut collected = vec![anchor];
    let mut truncated = false;
    let mut next = parent[anchor]?;
    while next != anchor {
        if collected.len() >= MAX_CYCLE_NODES {
            truncated = true;
            break;
        }
        collected.push(next);
        next = parent[next]?;
    }
    collected.push(anchor);
    collected.reverse();

    Some(CycleWalk {
        nodes: collected,
        truncated,
    })
}

/// Order-independent identity of a cycle: its sorted token indices
fn cycle_key(nodes: &[usize]) -> Vec<usize> {
    let mut key = nodes[..nodes.len() - 1].to_vec();
    key.sort_unstable();
    key.dedup();
    key
}

/// Resolve edges and score a walk. For parallel edges the first one in
/// insertion order is taken.
fn build_cycle(graph: &Graph, weights: &[f64], walk: &CycleWalk) -> ArbitrageCycle {
    let edges = graph.get_edges();
    let adjacency = graph.get_adjacency_list();

    let path: Vec<String> = walk
        .nodes
        .iter()
        .map(|&node| graph.get_node_name(node).to_string())
        .collect();

    let mut edge_indices = Vec::with_capacity(walk.nodes.len() - 1);
    let mut truncated = walk.truncated;
    for pair in walk.nodes.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        match adjacency[from].iter().copied().find(|&e| edges[e].to == to) {
            Some(index) => edge_indices.push(index),
            None => truncated = true,
        }
    }

    let product: f64 = edge_indices
        .iter()
        .map(|&e| edges[e].effective_rate())
        .product();
    let log_profit: f64 = edge_indices.iter().map(|&e| weights[e]).sum();
    let exchanges = edge_indices
        .iter()
        .map(|&e| edges[e].exchange.clone())
        .collect();

    ArbitrageCycle {
        path,
        path_length: edge_indices.len(),
        edge_indices,
        exchanges,
        raw_profit: product - 1.0,
        log_profit,
        detection_time_ms: 0.0,
        truncated,
    }
}

pub fn format_cycle_path(cycle: &ArbitrageCycle) -> String {
    cycle.path.join(" → ")
}
