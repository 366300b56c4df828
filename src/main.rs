//! Cycle Sniper - Arbitrage Cycle Scanner
//!
//! Run with: cargo run -- --demo
//!       or: cargo run -- --quotes snapshot.json

use clap::Parser;
use color_eyre::eyre::{bail, Result};
use console::style;
use petgraph::dot::Dot;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cycle_sniper::brain::{format_cycle_path, CycleDetector, DetectionReport, EdgePruner};
use cycle_sniper::cartographer::{load_quotes, synthetic_quotes, Graph, SyntheticMarket};
use cycle_sniper::config::{Config, ScanLog};

#[derive(Parser, Debug)]
#[command(name = "cycle-sniper", version, about = "Scan a quote graph for arbitrage cycles")]
struct Args {
    /// JSON snapshot of quotes
    #[arg(long, conflicts_with = "demo")]
    quotes: Option<PathBuf>,

    /// Scan a generated market instead of a snapshot
    #[arg(long)]
    demo: bool,

    #[arg(long, default_value_t = 7)]
    seed: u64,

    #[arg(long, default_value_t = 8)]
    tokens: usize,

    #[arg(long, default_value_t = 3)]
    venues: usize,

    /// Gross edge of the arbitrage planted in the demo market (0 for none)
    #[arg(long, default_value_t = 0.02)]
    planted_edge: f64,

    /// TOML config file (environment is used otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured cycle cap
    #[arg(long)]
    max_cycles: Option<usize>,

    /// Write the graph as Graphviz DOT
    #[arg(long)]
    dot: Option<PathBuf>,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🎯 CYCLE SNIPER - Negative Cycle Arbitrage Scanner").cyan().bold()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn print_report(report: &DetectionReport) {
    let metrics = &report.metrics;

    println!();
    println!("{}", style("═══ CYCLE ANALYSIS ═══").yellow().bold());
    println!();
    println!(
        "Scanned {} of {} sources in {:.3}ms: {} cycles",
        metrics.sources_scanned, metrics.graph_nodes, metrics.detection_time_ms, metrics.cycles_found
    );
    if metrics.truncated_cycles > 0 {
        println!(
            "{}",
            style(format!("⚠ {} cycles were truncated", metrics.truncated_cycles)).red()
        );
    }
    println!();

    for (i, cycle) in report.cycles.iter().enumerate() {
        let status = if cycle.raw_profit > 0.0 {
            style("✓ PROFITABLE").green()
        } else {
            style("✗ unprofitable").red()
        };
        let venue_tag = if cycle.is_cross_venue() {
            style(" [CROSS-VENUE]").magenta().bold()
        } else {
            style("").dim()
        };

        println!(
            "  {}. {}{} | {:.6}x return ({:+.4}%) | {} hops",
            i + 1,
            status,
            venue_tag,
            cycle.expected_return(),
            cycle.profit_percentage(),
            cycle.hop_count()
        );
        println!("     Path:   {}", style(format_cycle_path(cycle)).cyan());
        println!("     Venues: {}", style(cycle.venue_path()).magenta());
        println!("     Log profit: {:.6}", cycle.log_profit);
        println!();
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cycle_sniper=info".parse()?),
        )
        .init();

    let args = Args::parse();

    print_banner();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(max_cycles) = args.max_cycles {
        config.max_cycles = max_cycles;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    config.print_summary();
    println!();

    // =============================================
    // PHASE 1: THE CARTOGRAPHER
    // =============================================
    println!("{}", style("═══ PHASE 1: THE CARTOGRAPHER ═══").blue().bold());
    println!();

    let quotes = if let Some(path) = &args.quotes {
        load_quotes(path)?
    } else if args.demo {
        let market = SyntheticMarket {
            seed: args.seed,
            tokens: args.tokens,
            venues: args.venues,
            planted_edge: (args.planted_edge > 0.0).then_some(args.planted_edge),
            ..Default::default()
        };
        info!(
            "Generating demo market: {} tokens x {} venues (seed {})",
            market.tokens, market.venues, market.seed
        );
        synthetic_quotes(&market)
    } else {
        bail!("nothing to scan: pass --quotes <file> or --demo");
    };

    let start = Instant::now();
    let mut graph = Graph::from_quotes(&quotes);
    println!(
        "{} Graph built in {:?}: {} nodes, {} edges",
        style("✓").green(),
        start.elapsed(),
        graph.node_count(),
        graph.edge_count()
    );

    if let Some(path) = &args.dot {
        fs::write(path, format!("{}", Dot::new(&graph.to_digraph())))?;
        info!("Graph written to {}", path.display());
    }

    // =============================================
    // PHASE 2: THE BRAIN
    // =============================================
    println!();
    println!("{}", style("═══ PHASE 2: THE BRAIN ═══").magenta().bold());
    println!();

    let mut pruner = EdgePruner::new(config.pruning.clone());
    let prunable = pruner.prune_edges(&graph);
    println!(
        "{} {} of {} edges fail the pruning policy",
        style("✓").green(),
        prunable,
        graph.edge_count()
    );

    if config.apply_pruning && prunable > 0 {
        graph = pruner.prune_graph(&graph);
        println!(
            "{} Pruned graph: {} nodes, {} edges",
            style("✓").green(),
            graph.node_count(),
            graph.edge_count()
        );
    }

    println!("{}", style("Running Bellman-Ford detection...").magenta());
    let detector = CycleDetector::with_config(config.detector_config());
    let report = detector.detect(&graph, config.max_cycles);

    if report.cycles.is_empty() {
        warn!("No arbitrage cycles found");
    }
    print_report(&report);

    if config.scan_log {
        ScanLog::from_report(&report, prunable).append_to_file(&config.scan_log_path)?;
        info!("Scan appended to {}", config.scan_log_path);
    }

    Ok(())
}
