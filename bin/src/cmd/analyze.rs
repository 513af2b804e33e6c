//! Basis analysis command implementation.

use crate::data::{load_prices, write_outputs};
use anyhow::{Context, Result};
use clap::ValueEnum;
use contango::{Analysis, AnalysisConfig, SamplingInterval, analyze};
use contango_eval::{BacktestReport, ReportSnapshot};
use contango_signals::regime::RegimeThresholds;
use contango_traits::{AlignmentPolicy, CleaningReport};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format of the analysis report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Arguments of the `analyze` subcommand.
#[derive(Debug)]
pub(crate) struct AnalyzeArgs {
    pub(crate) spot: PathBuf,
    pub(crate) futures: PathBuf,
    pub(crate) interval: SamplingInterval,
    pub(crate) config: Option<PathBuf>,
    pub(crate) policy: Option<AlignmentPolicy>,
    pub(crate) format: OutputFormat,
    pub(crate) output_dir: Option<PathBuf>,
}

/// Serializable view of an analysis for JSON output.
#[derive(Debug, Serialize)]
struct AnalysisOutput<'a> {
    interval: String,
    cleaning: &'a CleaningReport,
    regime_thresholds: Option<RegimeThresholds>,
    regime_transitions: usize,
    backtest: Option<&'a BacktestReport>,
    snapshot: &'a ReportSnapshot,
}

impl<'a> From<&'a Analysis> for AnalysisOutput<'a> {
    fn from(analysis: &'a Analysis) -> Self {
        Self {
            interval: analysis.interval().to_string(),
            cleaning: &analysis.cleaning,
            regime_thresholds: analysis.regime.thresholds,
            regime_transitions: analysis.regime.transitions,
            backtest: analysis.backtest.as_ref(),
            snapshot: &analysis.snapshot,
        }
    }
}

/// Load a configuration file, or the defaults when none is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

/// Run the analysis and print the report.
pub(crate) fn run_analysis(args: AnalyzeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(policy) = args.policy {
        config.policy = policy;
    }

    let spot = load_prices(&args.spot)
        .with_context(|| format!("loading spot prices from {}", args.spot.display()))?;
    let futures = load_prices(&args.futures)
        .with_context(|| format!("loading futures prices from {}", args.futures.display()))?;

    let analysis = analyze(args.interval, &spot, &futures, &config)?;

    if let Some(dir) = &args.output_dir {
        write_outputs(dir, &analysis)?;
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&AnalysisOutput::from(&analysis))?;
            println!("{json}");
        }
        OutputFormat::Text => print_report(&analysis, &config),
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.precision$}"))
}

fn print_report(analysis: &Analysis, config: &AnalysisConfig) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Basis Analysis                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let snapshot = &analysis.snapshot;
    let period = &snapshot.period;
    println!("Interval: {}", analysis.interval());
    println!(
        "Period:   {} to {} ({} days)",
        period.start.format("%Y-%m-%d %H:%M"),
        period.end.format("%Y-%m-%d %H:%M"),
        period.duration_days
    );
    println!(
        "Rows:     {} ({} policy, dropped {} spot / {} futures)",
        analysis.cleaning.rows,
        analysis.cleaning.policy,
        analysis.cleaning.spot_dropped,
        analysis.cleaning.futures_dropped
    );
    println!();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("MARKET OUTLOOK");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let outlook = &snapshot.outlook;
    match outlook.condition {
        Some(condition) => println!(
            "  Average condition: {:?} (mean basis {})",
            condition,
            fmt_opt(outlook.mean_basis, 2)
        ),
        None => println!("  Average condition: N/A"),
    }
    println!(
        "  Latest basis:      {} ({}%)",
        fmt_opt(snapshot.latest(contango::columns::BASIS), 2),
        fmt_opt(snapshot.latest(contango::columns::BASIS_PERCENT), 4)
    );
    println!(
        "  Annualized basis:  {}%",
        fmt_opt(snapshot.latest(contango::columns::ANNUALIZED_BASIS), 2)
    );
    println!(
        "  Market regime:     {}",
        outlook.latest_regime.map_or("N/A", |r| r.label())
    );
    println!(
        "  Basis z-score:     {}{}",
        fmt_opt(outlook.latest_zscore, 2),
        if outlook.zscore_breach {
            format!(" (beyond ±{})", outlook.zscore_threshold)
        } else {
            String::new()
        }
    );
    if let Some(condition) = outlook.condition {
        println!(
            "  Arbitrage ({}): {}",
            condition.strategy(),
            if outlook.favorable {
                "favored by current z-score"
            } else {
                "not currently favored"
            }
        );
    }
    match analysis.regime.thresholds {
        Some(t) => println!(
            "  Regime split:      {:.4} / {:.4} ({} transitions)",
            t.lower, t.upper, analysis.regime.transitions
        ),
        None => println!("  Regime split:      insufficient data"),
    }
    println!();

    if let Some(report) = &analysis.backtest {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("BACKTEST RESULTS");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        println!("Performance Metrics:");
        println!("  Initial Capital:   {:>12.2}", report.initial_capital);
        println!("  Final Equity:      {:>12.2}", report.final_equity);
        println!("  Total Return:      {:>11.2}%", report.total_return * 100.0);
        println!("  Sharpe Ratio:      {:>12}", fmt_opt(report.sharpe_ratio, 2));
        println!("  Max Drawdown:      {:>11.2}%", report.max_drawdown * 100.0);
        println!();

        println!("Trading Metrics:");
        println!("  Number of Trades:  {:>12}", report.trade_count);
        println!("  Win Rate:          {:>11.2}%", report.win_rate * 100.0);
        println!(
            "  Transaction Costs: {:>11.2}% ({} per trade)",
            report.total_transaction_costs * 100.0,
            config.backtest.transaction_cost
        );
        println!();
    }
}
