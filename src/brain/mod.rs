//! Phase 2: The Brain
//!
//! Responsible for:
//! - Screening quotes against liquidity/fee/rate policy
//! - Finding negative cycles (arbitrage opportunities) using Bellman-Ford

mod bellman_ford;
mod filter;

pub use bellman_ford::{
    format_cycle_path, ArbitrageCycle, CycleDetector, DetectionMetrics, DetectionReport,
    DetectorConfig, DEFAULT_MAX_CYCLES, MAX_CYCLE_NODES,
};
pub use filter::{EdgePruner, PruningConfig};
