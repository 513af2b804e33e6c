//! Annualized basis over an assumed time to maturity.

use contango_traits::params::ensure_positive;
use contango_traits::types::float_column;
use contango_traits::{
    BasisSeries, CALENDAR_DAYS_PER_YEAR, ContangoError, Result, Transform, columns,
};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};

/// Configuration for the annualized basis.
///
/// The engine does not infer time to maturity from the data; perpetual and
/// dated contracts alike are annualized over `days_to_maturity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnualizedBasisConfig {
    /// Assumed days until the futures contract expires (default: 30).
    pub days_to_maturity: i64,
    /// Days per year used to annualize (default: 365, calendar convention).
    pub days_per_year: f64,
}

impl Default for AnnualizedBasisConfig {
    fn default() -> Self {
        Self {
            days_to_maturity: 30,
            days_per_year: CALENDAR_DAYS_PER_YEAR,
        }
    }
}

impl AnnualizedBasisConfig {
    /// Checks that both values are positive.
    ///
    /// # Errors
    ///
    /// Annualizing over zero or negative time is undefined.
    pub fn validate(&self) -> Result<()> {
        if self.days_to_maturity <= 0 {
            return Err(ContangoError::invalid_parameter(
                "days_to_maturity",
                format!("must be positive, got {}", self.days_to_maturity),
            ));
        }
        ensure_positive("days_per_year", self.days_per_year)
    }
}

/// `((futures / spot) - 1) * (days_per_year / days_to_maturity) * 100` per row.
///
/// # Errors
///
/// Fails if the configuration is invalid.
pub fn annualized_basis(
    spot: &[Option<f64>],
    futures: &[Option<f64>],
    config: &AnnualizedBasisConfig,
) -> Result<Vec<Option<f64>>> {
    config.validate()?;
    let factor = config.days_per_year / config.days_to_maturity as f64;
    Ok(spot
        .iter()
        .zip(futures)
        .map(|(s, f)| match (s, f) {
            (Some(s), Some(f)) if *s != 0.0 => Some((f / s - 1.0) * factor * 100.0),
            _ => None,
        })
        .collect())
}

/// Annualized basis transform.
#[derive(Debug, Clone, Default)]
pub struct AnnualizedBasis {
    config: AnnualizedBasisConfig,
}

impl AnnualizedBasis {
    /// Create a new annualized basis transform with the given configuration.
    #[must_use]
    pub const fn new(config: AnnualizedBasisConfig) -> Self {
        Self { config }
    }

    /// Get the assumed days to maturity.
    #[must_use]
    pub const fn days_to_maturity(&self) -> i64 {
        self.config.days_to_maturity
    }
}

impl Transform for AnnualizedBasis {
    fn name(&self) -> &str {
        "annualized_basis"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::SPOT_PRICE, columns::FUTURES_PRICE]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::ANNUALIZED_BASIS]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        let spot = series.values(columns::SPOT_PRICE)?;
        let futures = series.values(columns::FUTURES_PRICE)?;
        let annualized = annualized_basis(&spot, &futures, &self.config)?;
        Ok(vec![float_column(columns::ANNUALIZED_BASIS, annualized)])
    }
}
