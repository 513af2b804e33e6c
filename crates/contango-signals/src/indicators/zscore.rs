//! Rolling z-score of the percent basis.

use contango_traits::params::ensure_window;
use contango_traits::stats::{MIN_STD_THRESHOLD, rolling_mean, rolling_std};
use contango_traits::types::float_column;
use contango_traits::{BasisSeries, Result, Transform, check_history, columns};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};

/// Configuration for the basis z-score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZScoreConfig {
    /// Trailing window for mean and sample standard deviation (default: 30).
    pub window: usize,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self { window: 30 }
    }
}

impl ZScoreConfig {
    /// Checks that the window admits a sample standard deviation.
    ///
    /// # Errors
    ///
    /// Fails for windows shorter than 2.
    pub fn validate(&self) -> Result<()> {
        ensure_window("zscore_window", self.window, 2)
    }
}

/// `(x(t) - mean(window)) / std(window)` with sample std.
///
/// Undefined for the first `window - 1` rows, for any window containing an
/// undefined cell, and for a flat window: zero dispersion carries no signal,
/// so it yields neither infinity nor zero.
///
/// # Errors
///
/// Fails for a window shorter than 2.
pub fn basis_zscore(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    ensure_window("zscore_window", window, 2)?;

    let mean = rolling_mean(values, window);
    let std = rolling_std(values, window);

    Ok(values
        .iter()
        .zip(mean.iter().zip(&std))
        .map(|(x, (m, s))| match (x, m, s) {
            (Some(x), Some(m), Some(s)) if *s > MIN_STD_THRESHOLD => Some((x - m) / s),
            _ => None,
        })
        .collect())
}

/// Rolling z-score transform writing `basis_zscore`.
#[derive(Debug, Clone, Default)]
pub struct BasisZScore {
    config: ZScoreConfig,
}

impl BasisZScore {
    /// Create a new z-score transform with the given configuration.
    #[must_use]
    pub const fn new(config: ZScoreConfig) -> Self {
        Self { config }
    }

    /// Get the rolling window.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.config.window
    }
}

impl Transform for BasisZScore {
    fn name(&self) -> &str {
        "basis_zscore"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::BASIS_PERCENT]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::BASIS_ZSCORE]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        self.config.validate()?;
        check_history(self.name(), series.len(), self.config.window);
        let values = series.values(columns::BASIS_PERCENT)?;
        let z = basis_zscore(&values, self.config.window)?;
        Ok(vec![float_column(columns::BASIS_ZSCORE, z)])
    }
}
