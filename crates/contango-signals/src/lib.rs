//! Basis analytics transforms for contango.
//!
//! This crate provides the stages that turn an aligned spot/futures table into
//! derived indicators, grouped by what they measure:
//! - Spread: raw basis, percent basis and annualized basis
//! - Indicators: rolling z-score, momentum and volatility-adjusted basis
//! - Regime: static percentile classification into backwardation, neutral, contango
//! - Trading: z-score threshold signals and ATR-normalized position sizing
//!
//! Every stage implements [`contango_traits::Transform`] and also exposes the
//! slice-level function it is built on, so numerics can be used without a frame.
//!
//! # Example
//!
//! ```ignore
//! use contango_signals::spread::BasisSpread;
//! use contango_signals::indicators::BasisZScore;
//!
//! series.apply(&BasisSpread)?;
//! series.apply(&BasisZScore::default())?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod indicators;
pub mod regime;
pub mod registry;
pub mod spread;
pub mod trading;

// Re-export key types
pub use regime::{MarketRegime, RegimeClassification, RegimeDetector};
pub use registry::{Stage, TransformInfo, available_transforms};
pub use trading::TradeSignal;
