//! Describe-style summary statistics.
//!
//! One row per numeric column: count of defined values, mean, sample std,
//! min, quartiles and max. Integer code columns are summarized as floats.

use contango_traits::stats::{defined, moments, percentile};
use contango_traits::{BasisSeries, Result, columns};
use serde::{Deserialize, Serialize};

/// Statistics of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Column name
    pub column: String,
    /// Number of defined values
    pub count: usize,
    /// Mean
    pub mean: Option<f64>,
    /// Sample standard deviation
    pub std: Option<f64>,
    /// Minimum
    pub min: Option<f64>,
    /// 25th percentile
    pub p25: Option<f64>,
    /// Median
    pub p50: Option<f64>,
    /// 75th percentile
    pub p75: Option<f64>,
    /// Maximum
    pub max: Option<f64>,
}

impl ColumnSummary {
    /// Summarizes the defined cells of a column.
    #[must_use]
    pub fn from_values(column: &str, values: &[Option<f64>]) -> Self {
        let observed = defined(values);
        let m = moments(values);
        Self {
            column: column.to_string(),
            count: m.count,
            mean: m.mean,
            std: m.std,
            min: observed.iter().copied().reduce(f64::min),
            p25: percentile(&observed, 25.0),
            p50: percentile(&observed, 50.0),
            p75: percentile(&observed, 75.0),
            max: observed.iter().copied().reduce(f64::max),
        }
    }

    fn round(&self, decimals: i32) -> Self {
        let scale = 10_f64.powi(decimals);
        let r = |v: Option<f64>| v.map(|x| (x * scale).round() / scale);
        Self {
            column: self.column.clone(),
            count: self.count,
            mean: r(self.mean),
            std: r(self.std),
            min: r(self.min),
            p25: r(self.p25),
            p50: r(self.p50),
            p75: r(self.p75),
            max: r(self.max),
        }
    }
}

/// Summary table over every numeric column of a series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Per-column statistics in column order
    pub columns: Vec<ColumnSummary>,
}

impl Summary {
    /// Summarizes every column except the timestamp.
    ///
    /// # Errors
    ///
    /// Fails if a column cannot be read as numbers.
    pub fn describe(series: &BasisSeries) -> Result<Self> {
        let columns = series
            .columns()
            .iter()
            .filter(|name| name.as_str() != columns::TIMESTAMP)
            .map(|name| Ok(ColumnSummary::from_values(name, &series.values(name)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Statistics of a column by name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == column)
    }

    /// Rounds every statistic to `decimals` places for presentation.
    #[must_use]
    pub fn rounded(&self, decimals: i32) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.round(decimals)).collect(),
        }
    }
}
