//! ATR-normalized position sizing.
//!
//! True range is approximated by the absolute first difference of the
//! futures close, so sizes shrink when recent swings grow.

use contango_traits::params::{ensure_fraction, ensure_positive, ensure_window};
use contango_traits::stats::{diff, rolling_mean};
use contango_traits::types::float_column;
use contango_traits::{BasisSeries, Result, Transform, check_history, columns};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};

/// ATR used before any positive value has been observed.
const FALLBACK_ATR: f64 = 1.0;

/// Configuration for position sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSizingConfig {
    /// Capital at risk and the cap on any single position (default: 10000).
    pub risk_capital: f64,
    /// Fraction of capital risked per trade (default: 0.02).
    pub max_risk_per_trade: f64,
    /// ATR smoothing window (default: 14).
    pub atr_window: usize,
}

impl Default for PositionSizingConfig {
    fn default() -> Self {
        Self {
            risk_capital: 10_000.0,
            max_risk_per_trade: 0.02,
            atr_window: 14,
        }
    }
}

impl PositionSizingConfig {
    /// Checks capital, risk fraction and window.
    ///
    /// # Errors
    ///
    /// Fails for non-positive capital, a risk fraction outside `(0, 1]` or a
    /// zero window.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("risk_capital", self.risk_capital)?;
        ensure_fraction("max_risk_per_trade", self.max_risk_per_trade)?;
        ensure_window("atr_window", self.atr_window, 1)
    }

    /// Capital risked on each trade.
    #[must_use]
    pub fn risk_amount(&self) -> f64 {
        self.risk_capital * self.max_risk_per_trade
    }
}

/// Rolling mean of `|futures(t) - futures(t-1)|`.
#[must_use]
pub fn average_true_range(futures: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let true_range: Vec<Option<f64>> = diff(futures)
        .into_iter()
        .map(|d| d.map(f64::abs))
        .collect();
    rolling_mean(&true_range, window)
}

/// `min(risk_amount / atr_safe, risk_capital)` per row.
///
/// `atr_safe` carries the last positive ATR forward over rows where ATR is
/// zero or undefined, and is 1 until one has been seen. Every row therefore
/// gets a finite size.
///
/// # Errors
///
/// Fails if the configuration is invalid.
pub fn position_size(futures: &[Option<f64>], config: &PositionSizingConfig) -> Result<Vec<f64>> {
    config.validate()?;
    let risk_amount = config.risk_amount();

    let mut last_atr = FALLBACK_ATR;
    Ok(average_true_range(futures, config.atr_window)
        .into_iter()
        .map(|atr| {
            if let Some(a) = atr.filter(|a| *a > 0.0) {
                last_atr = a;
            }
            (risk_amount / last_atr).min(config.risk_capital)
        })
        .collect())
}

/// Transform writing `position_size`.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    config: PositionSizingConfig,
}

impl PositionSizer {
    /// Create a new position sizer with the given configuration.
    #[must_use]
    pub const fn new(config: PositionSizingConfig) -> Self {
        Self { config }
    }

    /// Get the sizing configuration.
    #[must_use]
    pub const fn config(&self) -> &PositionSizingConfig {
        &self.config
    }
}

impl Transform for PositionSizer {
    fn name(&self) -> &str {
        "position_size"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::FUTURES_PRICE]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::POSITION_SIZE]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        check_history(self.name(), series.len(), self.config.atr_window);
        let futures = series.values(columns::FUTURES_PRICE)?;
        let sizes = position_size(&futures, &self.config)?;
        Ok(vec![float_column(
            columns::POSITION_SIZE,
            sizes.into_iter().map(Some).collect(),
        )])
    }
}
