//! Phase 1: The Cartographer (Data Ingest)
//!
//! Turns market snapshots into the quote graph the brain searches.

mod graph;
mod market;

pub use graph::{Edge, Graph, INVALID_EDGE_WEIGHT};
pub use market::{load_quotes, save_quotes, synthetic_quotes, MarketQuote, SyntheticMarket};
