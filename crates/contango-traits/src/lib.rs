#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the contango futures/spot basis analytics engine.
//!
//! This crate provides the data model shared by every analytics stage:
//! price series, the aligned [`BasisSeries`] table, the error taxonomy,
//! rolling statistics over optional cells and the [`Transform`] trait.

/// The version of the contango-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod align;
pub mod error;
pub mod interval;
pub mod params;
pub mod stats;
pub mod transform;
pub mod types;

// Re-exports
pub use align::{AlignmentPolicy, CleaningReport};
pub use error::{ContangoError, Result};
pub use interval::{IntervalUnit, SamplingInterval};
pub use transform::{Transform, check_history, has_sufficient_history};
pub use types::{BasisSeries, PricePoint, PriceSeries, columns};

/// Calendar days per year, used to annualize the basis over time-to-maturity.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Trading periods per year under the equity-market convention.
///
/// Crypto markets trade every day, so callers on hourly or daily crypto data
/// usually want [`SamplingInterval::periods_per_year`] instead.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_annualization_conventions() {
        assert!(CALENDAR_DAYS_PER_YEAR > TRADING_DAYS_PER_YEAR);
    }
}
