//! Backtesting and reporting for contango.
//!
//! This crate consumes a finished [`contango_traits::BasisSeries`]:
//! - Backtester: lagged-signal strategy on basis returns with transaction costs
//! - Summary: describe-style statistics for every numeric column
//! - Snapshot: the latest-row data a report renders, with a market outlook
//!
//! # Example
//!
//! ```rust,ignore
//! use contango_eval::{Backtester, BacktestConfig, ReportSnapshot};
//!
//! let report = Backtester::new(BacktestConfig::default()).run(&mut series)?;
//! println!("Total Return: {:.2}%", report.total_return * 100.0);
//!
//! let snapshot = ReportSnapshot::from_series(&series, 2.0)?;
//! ```

pub mod backtest;
pub mod snapshot;
pub mod summary;

// Re-export main types
pub use backtest::{BacktestConfig, BacktestReport, BacktestRun, Backtester};
pub use snapshot::{AnalysisPeriod, LatestValue, MarketCondition, MarketOutlook, ReportSnapshot};
pub use summary::{ColumnSummary, Summary};
