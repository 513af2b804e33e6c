#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # contango
//!
//! contango is an umbrella crate that re-exports the contango sub-crates and
//! adds the [`analyze`] pipeline on top of them.
//!
//! ## Crate Organization
//!
//! - [`traits`] - Data model, error types and the [`Transform`] seam
//! - [`signals`] - Basis, indicator, regime and trading transforms
//! - [`eval`] - Backtester, summary statistics and report snapshot
//! - [`pipeline`] - [`AnalysisConfig`] and the end-to-end entry points
//!
//! ## Architecture
//!
//! 1. **Alignment** matches spot and futures closes into one [`BasisSeries`]
//! 2. **Transforms** read existing columns and return new ones to merge
//! 3. **Evaluation** consumes the finished table: backtest, summary, snapshot

/// Version information for the contango crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod pipeline;

pub use pipeline::{Analysis, AnalysisConfig, BatchJob, analyze, analyze_batch};

// ============================================================================
// Core Types
// ============================================================================

/// Data model, error types and shared numerics.
///
/// # Example
///
/// ```ignore
/// use contango::traits::{BasisSeries, SamplingInterval};
/// ```
pub mod traits {
    pub use contango_traits::*;
}

// Re-export core types at top level for convenience
pub use contango_traits::{
    AlignmentPolicy, BasisSeries, CleaningReport, PricePoint, PriceSeries, SamplingInterval,
    Transform, columns,
};

// Re-export error types
pub use contango_traits::{ContangoError, Result};

// ============================================================================
// Transforms
// ============================================================================

/// Basis analytics transforms.
///
/// ## Stages
///
/// - **Spread**: basis, basis percent, annualized basis
/// - **Indicators**: rolling z-score, momentum, volatility-adjusted basis
/// - **Regime**: static 33/67 percentile classification
/// - **Trading**: z-score threshold signal, ATR-normalized position size
///
/// # Example
///
/// ```ignore
/// use contango::signals::spread::BasisSpread;
/// use contango::signals::indicators::BasisZScore;
///
/// series.apply(&BasisSpread)?;
/// series.apply(&BasisZScore::default())?;
/// ```
pub mod signals {
    pub use contango_signals::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Backtesting and reporting.
///
/// ```text
/// strategy_return(t) = signal(t-1) * pct_change(basis_percent)(t)
/// net_return(t)      = strategy_return(t) - cost * [signal(t) != signal(t-1)]
/// ```
pub mod eval {
    pub use contango_eval::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use contango::prelude::*;
/// ```
pub mod prelude {
    pub use crate::pipeline::{Analysis, AnalysisConfig, analyze};
    pub use crate::{BasisSeries, PriceSeries, SamplingInterval, Transform};
    pub use crate::{ContangoError, Result};
}
