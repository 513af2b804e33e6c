//! Report snapshot: the latest-row data contract a report renders.

use crate::summary::Summary;
use chrono::{DateTime, Utc};
use contango_signals::MarketRegime;
use contango_traits::params::ensure_positive;
use contango_traits::{BasisSeries, Result, columns};
use serde::{Deserialize, Serialize};

/// Average market state over the analysis period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCondition {
    /// Mean basis non-negative: futures above spot.
    Contango,
    /// Mean basis negative: futures below spot.
    Backwardation,
}

impl MarketCondition {
    /// Condition implied by a mean basis.
    #[must_use]
    pub fn from_mean_basis(mean_basis: f64) -> Self {
        if mean_basis < 0.0 {
            Self::Backwardation
        } else {
            Self::Contango
        }
    }

    /// Arbitrage legs suited to this condition.
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Contango => "buy spot, sell futures",
            Self::Backwardation => "buy futures, sell spot",
        }
    }
}

/// First and last sample time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    /// First timestamp
    pub start: DateTime<Utc>,
    /// Last timestamp
    pub end: DateTime<Utc>,
    /// Whole days spanned, counting both ends
    pub duration_days: i64,
}

impl AnalysisPeriod {
    /// Period between two instants.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration_days: (end - start).num_days() + 1,
        }
    }
}

/// One cell of the last row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestValue {
    /// Column name
    pub column: String,
    /// Value, `None` when undefined
    pub value: Option<f64>,
}

/// Reading of the latest state against the whole period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOutlook {
    /// Condition implied by the mean basis
    pub condition: Option<MarketCondition>,
    /// Mean basis over the period
    pub mean_basis: Option<f64>,
    /// Regime of the last row
    pub latest_regime: Option<MarketRegime>,
    /// Z-score of the last row
    pub latest_zscore: Option<f64>,
    /// Threshold used for the breach check
    pub zscore_threshold: f64,
    /// `|latest_zscore| > zscore_threshold`
    pub zscore_breach: bool,
    /// Whether the latest z-score confirms the arbitrage the average
    /// condition suggests
    pub favorable: bool,
}

impl MarketOutlook {
    /// Builds the outlook from its inputs.
    #[must_use]
    pub fn new(
        mean_basis: Option<f64>,
        latest_regime: Option<MarketRegime>,
        latest_zscore: Option<f64>,
        zscore_threshold: f64,
    ) -> Self {
        let condition = mean_basis.map(MarketCondition::from_mean_basis);
        let zscore_breach = latest_zscore.is_some_and(|z| z.abs() > zscore_threshold);
        let favorable = match (condition, latest_zscore) {
            (Some(MarketCondition::Backwardation), Some(z)) => z < -zscore_threshold,
            (Some(MarketCondition::Contango), Some(z)) => z > zscore_threshold,
            _ => false,
        };
        Self {
            condition,
            mean_basis,
            latest_regime,
            latest_zscore,
            zscore_threshold,
            zscore_breach,
            favorable,
        }
    }
}

/// Everything a report needs from a finished series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    /// Storage key of the sampling interval, e.g. `1hour`
    pub interval: String,
    /// Analysis period
    pub period: AnalysisPeriod,
    /// Last row, timestamp excluded
    pub latest: Vec<LatestValue>,
    /// Column statistics
    pub summary: Summary,
    /// Market outlook
    pub outlook: MarketOutlook,
}

impl ReportSnapshot {
    /// Builds the snapshot from a series.
    ///
    /// Columns that were never computed simply contribute nothing; an
    /// absent `basis_zscore` leaves the outlook without a breach.
    ///
    /// # Errors
    ///
    /// Fails for a non-positive threshold or an unreadable column.
    pub fn from_series(series: &BasisSeries, zscore_threshold: f64) -> Result<Self> {
        ensure_positive("zscore_threshold", zscore_threshold)?;
        let (start, end) = series.time_range()?;
        let summary = Summary::describe(series)?;

        let latest = summary
            .columns
            .iter()
            .map(|c| {
                Ok(LatestValue {
                    column: c.column.clone(),
                    value: last(&series.values(&c.column)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let latest_regime = if series.has_column(columns::MARKET_REGIME) {
            series
                .codes(columns::MARKET_REGIME)?
                .last()
                .copied()
                .flatten()
                .and_then(MarketRegime::from_code)
        } else {
            None
        };

        let outlook = MarketOutlook::new(
            summary.get(columns::BASIS).and_then(|c| c.mean),
            latest_regime,
            latest
                .iter()
                .find(|v| v.column == columns::BASIS_ZSCORE)
                .and_then(|v| v.value),
            zscore_threshold,
        );

        Ok(Self {
            interval: series.interval().storage_key(),
            period: AnalysisPeriod::new(start, end),
            latest,
            summary,
            outlook,
        })
    }

    /// Value of a column in the last row.
    #[must_use]
    pub fn latest(&self, column: &str) -> Option<f64> {
        self.latest
            .iter()
            .find(|v| v.column == column)
            .and_then(|v| v.value)
    }
}

fn last(values: &[Option<f64>]) -> Option<f64> {
    values.last().copied().flatten()
}
