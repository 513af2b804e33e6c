//! Basis momentum: trailing sum of percent-basis changes.

use contango_traits::params::ensure_window;
use contango_traits::stats::{pct_change, rolling_sum};
use contango_traits::types::float_column;
use contango_traits::{BasisSeries, Result, Transform, check_history, columns};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};

/// Configuration for basis momentum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Number of trailing changes summed (default: 14).
    pub window: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self { window: 14 }
    }
}

impl MomentumConfig {
    /// Checks that the window is positive.
    ///
    /// # Errors
    ///
    /// Fails for a zero window.
    pub fn validate(&self) -> Result<()> {
        ensure_window("momentum_window", self.window, 1)
    }
}

/// Sum of `x(t)/x(t-1) - 1` over the trailing `window` periods.
///
/// A single undefined change, including one caused by the basis passing
/// through zero, makes every window containing it undefined.
///
/// # Errors
///
/// Fails for a zero window.
pub fn basis_momentum(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    ensure_window("momentum_window", window, 1)?;
    Ok(rolling_sum(&pct_change(values), window))
}

/// Momentum transform writing `basis_momentum`.
#[derive(Debug, Clone, Default)]
pub struct BasisMomentum {
    config: MomentumConfig,
}

impl BasisMomentum {
    /// Create a new momentum transform with the given configuration.
    #[must_use]
    pub const fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Get the rolling window.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.config.window
    }
}

impl Transform for BasisMomentum {
    fn name(&self) -> &str {
        "basis_momentum"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::BASIS_PERCENT]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::BASIS_MOMENTUM]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        self.config.validate()?;
        check_history(self.name(), series.len(), self.config.window);
        let values = series.values(columns::BASIS_PERCENT)?;
        let momentum = basis_momentum(&values, self.config.window)?;
        Ok(vec![float_column(columns::BASIS_MOMENTUM, momentum)])
    }
}
