//! Scanner Configuration
//!
//! Detection and pruning settings, loadable from the environment (with
//! `.env` support) or from a TOML file.

use chrono::{DateTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::brain::{
    format_cycle_path, DetectionReport, DetectorConfig, PruningConfig, DEFAULT_MAX_CYCLES,
};

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Detection Settings ==========
    /// Maximum distinct cycles returned per scan
    pub max_cycles: usize,

    /// Relax source tokens in parallel
    pub parallel: bool,

    // ========== Logging ==========
    /// Append a JSON line per scan to `scan_log_path`
    pub scan_log: bool,

    pub scan_log_path: String,

    // ========== Pruning Settings ==========
    /// Drop failing quotes before detection instead of only counting them
    pub apply_pruning: bool,

    /// Quote policy thresholds (kept last: TOML tables follow plain values)
    pub pruning: PruningConfig,
}

/// Parse an env var, keeping `default` when it is unset or malformed
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let pruning = defaults.pruning.clone();

        Ok(Self {
            max_cycles: env_or("MAX_CYCLES", defaults.max_cycles),
            parallel: env_or("PARALLEL_SCAN", defaults.parallel),

            pruning: PruningConfig {
                min_liquidity: env_or("MIN_LIQUIDITY", pruning.min_liquidity),
                max_fee: env_or("MAX_FEE", pruning.max_fee),
                min_rate: env_or("MIN_RATE", pruning.min_rate),
                max_rate: env_or("MAX_RATE", pruning.max_rate),
                enable_liquidity_pruning: env_or(
                    "ENABLE_LIQUIDITY_PRUNING",
                    pruning.enable_liquidity_pruning,
                ),
                enable_fee_pruning: env_or("ENABLE_FEE_PRUNING", pruning.enable_fee_pruning),
                enable_rate_pruning: env_or("ENABLE_RATE_PRUNING", pruning.enable_rate_pruning),
            },
            apply_pruning: env_or("APPLY_PRUNING", defaults.apply_pruning),

            scan_log: env_or("SCAN_LOG", defaults.scan_log),
            scan_log_path: env::var("SCAN_LOG_PATH").unwrap_or(defaults.scan_log_path),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            parallel: self.parallel,
        }
    }

    /// Reject thresholds that cannot describe a real quote policy
    pub fn validate(&self) -> Result<()> {
        let pruning = &self.pruning;

        if !(0.0..1.0).contains(&pruning.max_fee) {
            return Err(eyre::eyre!(
                "MAX_FEE must be in [0, 1) (currently {})",
                pruning.max_fee
            ));
        }
        if !pruning.min_liquidity.is_finite() || pruning.min_liquidity < 0.0 {
            return Err(eyre::eyre!(
                "MIN_LIQUIDITY must be a non-negative number (currently {})",
                pruning.min_liquidity
            ));
        }
        if !pruning.min_rate.is_finite() || pruning.min_rate <= 0.0 {
            return Err(eyre::eyre!(
                "MIN_RATE must be a positive number (currently {})",
                pruning.min_rate
            ));
        }
        if pruning.max_rate.is_nan() {
            return Err(eyre::eyre!("MAX_RATE must be a number"));
        }
        if pruning.min_rate > pruning.max_rate {
            return Err(eyre::eyre!(
                "MIN_RATE ({}) is above MAX_RATE ({})",
                pruning.min_rate,
                pruning.max_rate
            ));
        }
        if self.scan_log && self.scan_log_path.is_empty() {
            return Err(eyre::eyre!("SCAN_LOG is enabled but SCAN_LOG_PATH is empty"));
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let on_off = |flag: bool| if flag { "✓ Enabled" } else { "✗ Disabled" };
        let pruning = &self.pruning;

        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              CYCLE SNIPER - CONFIGURATION                  ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ DETECTION                                                  ║");
        println!("║ • Max Cycles:      {:^40} ║", self.max_cycles);
        println!("║ • Parallel Scan:   {:^40} ║", on_off(self.parallel));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ PRUNING                                                    ║");
        println!("║ • Min Liquidity:   {:<40.2} ║", pruning.min_liquidity);
        println!("║   └ rule:          {:^40} ║", on_off(pruning.enable_liquidity_pruning));
        println!("║ • Max Fee:         {:<39.3}% ║", pruning.max_fee * 100.0);
        println!("║   └ rule:          {:^40} ║", on_off(pruning.enable_fee_pruning));
        println!("║ • Rate Bounds:     {:<40} ║", format!("[{:e}, {:e}]", pruning.min_rate, pruning.max_rate));
        println!("║   └ rule:          {:^40} ║", on_off(pruning.enable_rate_pruning));
        println!("║ • Apply to Graph:  {:^40} ║", on_off(self.apply_pruning));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ • Scan Log:        {:^40} ║", on_off(self.scan_log));
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            parallel: false,
            pruning: PruningConfig::default(),
            apply_pruning: false,
            scan_log: false,
            scan_log_path: "./logs/scans.log".to_string(),
        }
    }
}

// ============================================
// SCAN LOGGER
// ============================================

/// One line of the scan log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanLog {
    pub timestamp: DateTime<Utc>,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub edges_prunable: usize,
    pub detection_time_ms: f64,
    pub cycles: Vec<ScanLogCycle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanLogCycle {
    pub path: String,
    pub exchanges: Vec<String>,
    pub raw_profit: f64,
    pub log_profit: f64,
    pub truncated: bool,
}

impl ScanLog {
    pub fn from_report(report: &DetectionReport, edges_prunable: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            graph_nodes: report.metrics.graph_nodes,
            graph_edges: report.metrics.graph_edges,
            edges_prunable,
            detection_time_ms: report.metrics.detection_time_ms,
            cycles: report
                .cycles
                .iter()
                .map(|cycle| ScanLogCycle {
                    path: format_cycle_path(cycle),
                    exchanges: cycle.exchanges.clone(),
                    raw_profit: cycle.raw_profit,
                    log_profit: cycle.log_profit,
                    truncated: cycle.truncated,
                })
                .collect(),
        }
    }

    /// Append this log to a file
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================
