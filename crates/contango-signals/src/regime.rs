//! Market regime detection.
//!
//! A static, whole-history classification of `basis_percent` into three
//! buckets split at its 33rd and 67th percentiles. Thresholds are computed
//! once over every defined value and applied retroactively to every row, so
//! early rows are classified with knowledge of later data. This is not a
//! causal or fitted model.

use contango_traits::stats::{defined, percentile};
use contango_traits::types::code_column;
use contango_traits::{BasisSeries, Result, Transform, columns};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Lower percentile splitting backwardation from neutral.
pub const LOWER_PERCENTILE: f64 = 33.0;

/// Upper percentile splitting neutral from contango.
pub const UPPER_PERCENTILE: f64 = 67.0;

/// Fewest defined observations for which percentiles are computed.
pub const MIN_OBSERVATIONS: usize = 3;

/// Coarse three-way classification of the basis level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegime {
    /// Basis in the bottom third of its history.
    Backwardation,
    /// Basis in the middle third, or not classifiable.
    #[default]
    Neutral,
    /// Basis in the top third of its history.
    Contango,
}

impl MarketRegime {
    /// Integer code stored in the `market_regime` column.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Backwardation => 0,
            Self::Neutral => 1,
            Self::Contango => 2,
        }
    }

    /// Inverse of [`MarketRegime::code`].
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Backwardation),
            1 => Some(Self::Neutral),
            2 => Some(Self::Contango),
            _ => None,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Backwardation => "backwardation",
            Self::Neutral => "neutral",
            Self::Contango => "contango",
        }
    }
}

/// Percentile split points of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeThresholds {
    /// 33rd percentile of `basis_percent`.
    pub lower: f64,
    /// 67th percentile of `basis_percent`.
    pub upper: f64,
}

/// Result of classifying a series.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeClassification {
    /// One label per row.
    pub labels: Vec<MarketRegime>,
    /// Split points, `None` when there was too little history to classify.
    pub thresholds: Option<RegimeThresholds>,
    /// Number of adjacent rows whose labels differ.
    pub transitions: usize,
}

impl RegimeClassification {
    /// Labels as column codes.
    #[must_use]
    pub fn codes(&self) -> Vec<i32> {
        self.labels.iter().map(MarketRegime::code).collect()
    }

    /// Whether percentiles could be computed.
    #[must_use]
    pub const fn is_classified(&self) -> bool {
        self.thresholds.is_some()
    }
}

/// Classifies every row by where its `basis_percent` sits in the whole
/// column's distribution.
///
/// Rows with an undefined value stay neutral. With fewer than
/// [`MIN_OBSERVATIONS`] defined values every row is neutral and no thresholds
/// are reported.
#[must_use]
pub fn classify(basis_percent: &[Option<f64>]) -> RegimeClassification {
    let observed = defined(basis_percent);
    let thresholds = if observed.len() < MIN_OBSERVATIONS {
        None
    } else {
        percentile(&observed, LOWER_PERCENTILE)
            .zip(percentile(&observed, UPPER_PERCENTILE))
            .map(|(lower, upper)| RegimeThresholds { lower, upper })
    };

    let labels: Vec<MarketRegime> = match thresholds {
        Some(t) => basis_percent
            .iter()
            .map(|v| match v {
                Some(x) if *x < t.lower => MarketRegime::Backwardation,
                Some(x) if *x > t.upper => MarketRegime::Contango,
                _ => MarketRegime::Neutral,
            })
            .collect(),
        None => vec![MarketRegime::Neutral; basis_percent.len()],
    };

    let transitions = labels.windows(2).filter(|w| w[0] != w[1]).count();

    RegimeClassification {
        labels,
        thresholds,
        transitions,
    }
}

/// Transform writing `market_regime`.
///
/// Takes no configuration: the split is always 33/67.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeDetector;

impl RegimeDetector {
    /// Classifies the series, writes `market_regime` and returns the
    /// classification with its thresholds and transition count.
    ///
    /// # Errors
    ///
    /// Returns [`contango_traits::ContangoError::MissingColumn`] if
    /// `basis_percent` has not been computed.
    pub fn detect(&self, series: &mut BasisSeries) -> Result<RegimeClassification> {
        series.require(self.required_columns())?;
        let classification = self.classify_series(series)?;
        series.set_column(code_column(
            columns::MARKET_REGIME,
            classification.codes(),
        ))?;
        Ok(classification)
    }

    fn classify_series(&self, series: &BasisSeries) -> Result<RegimeClassification> {
        let values = series.values(columns::BASIS_PERCENT)?;
        let classification = classify(&values);

        match classification.thresholds {
            Some(t) => info!(
                interval = %series.interval(),
                lower = t.lower,
                upper = t.upper,
                transitions = classification.transitions,
                "classified market regimes"
            ),
            None => warn!(
                interval = %series.interval(),
                observations = defined(&values).len(),
                "insufficient data for market regime detection, all rows neutral"
            ),
        }

        Ok(classification)
    }
}

impl Transform for RegimeDetector {
    fn name(&self) -> &str {
        "market_regime"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::BASIS_PERCENT]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::MARKET_REGIME]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        let classification = self.classify_series(series)?;
        Ok(vec![code_column(
            columns::MARKET_REGIME,
            classification.codes(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use contango_traits::SamplingInterval;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_codes_roundtrip() {
        for regime in [
            MarketRegime::Backwardation,
            MarketRegime::Neutral,
            MarketRegime::Contango,
        ] {
            assert_eq!(MarketRegime::from_code(regime.code()), Some(regime));
        }
        assert_eq!(MarketRegime::from_code(7), None);
        assert_eq!(MarketRegime::default(), MarketRegime::Neutral);
    }

    #[test]
    fn test_three_way_split() {
        let values = some(&[-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let c = classify(&values);
        let t = c.thresholds.unwrap();
        // rank 0.33 * 8 = 2.64, rank 0.67 * 8 = 5.36
        assert_relative_eq!(t.lower, 0.64, epsilon = 1e-12);
        assert_relative_eq!(t.upper, 3.36, epsilon = 1e-12);
        assert_eq!(c.codes(), vec![0, 0, 0, 1, 1, 1, 2, 2, 2]);
        assert_eq!(c.transitions, 2);
    }

    #[test]
    fn test_thresholds_are_ordered_and_buckets_partition() {
        let values = some(&[0.3, -0.7, 1.2, 0.05, 2.4, -1.1, 0.9, 0.9, 0.0, 3.3, -0.2]);
        let c = classify(&values);
        let t = c.thresholds.unwrap();
        assert!(t.lower <= t.upper);

        for (v, label) in values.iter().flatten().zip(&c.labels) {
            let expected = if *v < t.lower {
                MarketRegime::Backwardation
            } else if *v > t.upper {
                MarketRegime::Contango
            } else {
                MarketRegime::Neutral
            };
            assert_eq!(*label, expected);
        }
    }

    #[test]
    fn test_insufficient_history_all_neutral() {
        let c = classify(&[Some(1.0), None, Some(2.0)]);
        assert!(!c.is_classified());
        assert_eq!(c.labels, vec![MarketRegime::Neutral; 3]);
        assert_eq!(c.transitions, 0);
    }

    #[test]
    fn test_undefined_rows_are_neutral() {
        let c = classify(&[Some(-5.0), None, Some(0.0), Some(5.0)]);
        assert!(c.is_classified());
        assert_eq!(c.labels[1], MarketRegime::Neutral);
        assert_eq!(c.labels[0], MarketRegime::Backwardation);
        assert_eq!(c.labels[3], MarketRegime::Contango);
    }

    #[test]
    fn test_constant_series_is_all_neutral() {
        let c = classify(&some(&[1.0; 6]));
        assert!(c.is_classified());
        assert!(c.labels.iter().all(|r| *r == MarketRegime::Neutral));
    }

    #[test]
    fn test_transform_writes_codes() {
        let mut series = BasisSeries::from_aligned(
            SamplingInterval::DAILY,
            vec![0, 1, 2, 3],
            vec![100.0, 100.0, 100.0, 100.0],
            vec![98.0, 100.0, 100.5, 103.0],
        )
        .unwrap();
        series.apply(&crate::spread::BasisSpread).unwrap();
        series.apply(&RegimeDetector).unwrap();

        let codes = series.codes(columns::MARKET_REGIME).unwrap();
        assert_eq!(codes, vec![Some(0), Some(1), Some(1), Some(2)]);
    }

    #[test]
    fn test_detect_returns_classification() {
        let mut series = BasisSeries::from_aligned(
            SamplingInterval::DAILY,
            vec![0, 1, 2, 3],
            vec![100.0, 100.0, 100.0, 100.0],
            vec![98.0, 100.0, 100.5, 103.0],
        )
        .unwrap();
        assert!(RegimeDetector.detect(&mut series).is_err());

        series.apply(&crate::spread::BasisSpread).unwrap();
        let classification = RegimeDetector.detect(&mut series).unwrap();
        assert_eq!(classification.transitions, 2);
        assert_eq!(
            series.codes(columns::MARKET_REGIME).unwrap(),
            classification.codes().into_iter().map(Some).collect::<Vec<_>>()
        );
    }
}
