//! Market Snapshots
//!
//! Step 1.1: The Survey
//!
//! A snapshot is a flat JSON array of quotes, one per direction per venue.
//! The synthetic generator produces the same shape for demos and benches.

use eyre::{Result, WrapErr};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// One directed quote as delivered by a market-data feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub from: String,
    pub to: String,
    pub rate: f64,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub liquidity: f64,
    #[serde(default)]
    pub exchange: String,
}

/// Load a JSON snapshot of quotes
pub fn load_quotes<P: AsRef<Path>>(path: P) -> Result<Vec<MarketQuote>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading quote snapshot {}", path.display()))?;
    let quotes: Vec<MarketQuote> = serde_json::from_str(&content)
        .wrap_err_with(|| format!("parsing quote snapshot {}", path.display()))?;

    info!("Loaded {} quotes from {}", quotes.len(), path.display());
    Ok(quotes)
}

/// Write a snapshot in the same format `load_quotes` reads
pub fn save_quotes<P: AsRef<Path>>(quotes: &[MarketQuote], path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(quotes)?;
    fs::write(path, content)?;
    Ok(())
}

/// Parameters for a randomly generated market
#[derive(Debug, Clone)]
pub struct SyntheticMarket {
    pub seed: u64,
    pub tokens: usize,
    pub venues: usize,
    /// Relative noise applied to each venue's quote around the reference price
    pub spread: f64,
    pub fee: f64,
    /// Plant one triangular arbitrage with this gross edge (0.02 = 2%)
    pub planted_edge: Option<f64>,
}

impl Default for SyntheticMarket {
    fn default() -> Self {
        Self {
            seed: 7,
            tokens: 8,
            venues: 3,
            spread: 0.002,
            fee: 0.001,
            planted_edge: None,
        }
    }
}

/// Generate a fully connected market.
///
/// Every token gets a reference price; each venue quotes every ordered pair
/// at the reference cross rate with a little noise. The planted cycle runs
/// T0 -> T1 -> T2 -> T0 on a dedicated fee-free venue.
pub fn synthetic_quotes(market: &SyntheticMarket) -> Vec<MarketQuote> {
    let mut rng = StdRng::seed_from_u64(market.seed);

    let symbols: Vec<String> = (0..market.tokens).map(|i| format!("T{}", i)).collect();
    let prices: Vec<f64> = (0..market.tokens)
        .map(|_| rng.gen_range(0.01..10_000.0))
        .collect();

    let mut quotes = Vec::new();

    for venue in 0..market.venues {
        let exchange = format!("venue{}", venue);
        for i in 0..market.tokens {
            for j in 0..market.tokens {
                if i == j {
                    continue;
                }
                let noise = if market.spread > 0.0 {
                    rng.gen_range(-market.spread..market.spread)
                } else {
                    0.0
                };
                quotes.push(MarketQuote {
                    from: symbols[i].clone(),
                    to: symbols[j].clone(),
                    rate: prices[i] / prices[j] * (1.0 - market.spread + noise),
                    fee: market.fee,
                    liquidity: rng.gen_range(10.0..1_000_000.0),
                    exchange: exchange.clone(),
                });
            }
        }
    }

    if let Some(edge) = market.planted_edge {
        if market.tokens >= 3 {
            let legs = [(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0 + edge)];
            for (i, j, bonus) in legs {
                quotes.push(MarketQuote {
                    from: symbols[i].clone(),
                    to: symbols[j].clone(),
                    rate: prices[i] / prices[j] * bonus,
                    fee: 0.0,
                    liquidity: 1_000_000.0,
                    exchange: "planted".to_string(),
                });
            }
        }
    }

    quotes
}
