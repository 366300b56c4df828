//! Cycle Sniper - negative-cycle arbitrage detection
//!
//! - [`cartographer`]: the quote graph and market snapshots
//! - [`brain`]: edge pruning and Bellman-Ford cycle detection
//! - [`config`]: scanner settings and the scan log

pub mod brain;
pub mod cartographer;
pub mod config;

pub use brain::{
    ArbitrageCycle, CycleDetector, DetectionMetrics, DetectionReport, DetectorConfig, EdgePruner,
    PruningConfig, DEFAULT_MAX_CYCLES,
};
pub use cartographer::{Edge, Graph, MarketQuote};
pub use config::Config;
