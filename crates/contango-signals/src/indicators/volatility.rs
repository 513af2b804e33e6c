//! Volatility-adjusted basis.
//!
//! Spot volatility is the rolling sample std of spot returns scaled by
//! `sqrt(periods_per_year)`. The default of 252 is the equity trading-day
//! convention; crypto data sampled hourly or daily should usually override it
//! with [`contango_traits::SamplingInterval::periods_per_year`].

use contango_traits::params::{ensure_positive, ensure_window};
use contango_traits::stats::{MIN_STD_THRESHOLD, pct_change, rolling_std};
use contango_traits::types::float_column;
use contango_traits::{
    BasisSeries, Result, TRADING_DAYS_PER_YEAR, Transform, check_history, columns,
};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};

/// Configuration for volatility-adjusted basis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    /// Trailing window of spot returns (default: 30).
    pub vol_window: usize,
    /// Periods per year used to annualize (default: 252).
    pub periods_per_year: f64,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            vol_window: 30,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl VolatilityConfig {
    /// Checks the window and annualization factor.
    ///
    /// # Errors
    ///
    /// Fails for windows shorter than 2 or a non-positive periods-per-year.
    pub fn validate(&self) -> Result<()> {
        ensure_window("vol_window", self.vol_window, 2)?;
        ensure_positive("periods_per_year", self.periods_per_year)
    }
}

/// Annualized rolling volatility of spot returns.
///
/// # Errors
///
/// Fails if the configuration is invalid.
pub fn spot_volatility(
    spot: &[Option<f64>],
    config: &VolatilityConfig,
) -> Result<Vec<Option<f64>>> {
    config.validate()?;
    let scale = config.periods_per_year.sqrt();
    Ok(rolling_std(&pct_change(spot), config.vol_window)
        .into_iter()
        .map(|s| s.map(|s| s * scale))
        .collect())
}

/// `basis_percent / spot_volatility`, undefined where volatility is zero or
/// undefined.
#[must_use]
pub fn vol_adjusted_basis(
    basis_percent: &[Option<f64>],
    volatility: &[Option<f64>],
) -> Vec<Option<f64>> {
    basis_percent
        .iter()
        .zip(volatility)
        .map(|(b, v)| match (b, v) {
            (Some(b), Some(v)) if *v > MIN_STD_THRESHOLD => Some(b / v),
            _ => None,
        })
        .collect()
}

/// Transform writing `spot_volatility` and `vol_adjusted_basis`.
#[derive(Debug, Clone, Default)]
pub struct VolatilityAdjustedBasis {
    config: VolatilityConfig,
}

impl VolatilityAdjustedBasis {
    /// Create a new transform with the given configuration.
    #[must_use]
    pub const fn new(config: VolatilityConfig) -> Self {
        Self { config }
    }

    /// Get the volatility window.
    #[must_use]
    pub const fn vol_window(&self) -> usize {
        self.config.vol_window
    }
}

impl Transform for VolatilityAdjustedBasis {
    fn name(&self) -> &str {
        "vol_adjusted_basis"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::SPOT_PRICE, columns::BASIS_PERCENT]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::SPOT_VOLATILITY, columns::VOL_ADJUSTED_BASIS]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        check_history(self.name(), series.len(), self.config.vol_window);
        let spot = series.values(columns::SPOT_PRICE)?;
        let basis_percent = series.values(columns::BASIS_PERCENT)?;

        let vol = spot_volatility(&spot, &self.config)?;
        let adjusted = vol_adjusted_basis(&basis_percent, &vol);

        Ok(vec![
            float_column(columns::SPOT_VOLATILITY, vol),
            float_column(columns::VOL_ADJUSTED_BASIS, adjusted),
        ])
    }
}
