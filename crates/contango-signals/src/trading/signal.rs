//! Z-score threshold signals.

use crate::indicators::{ZScoreConfig, basis_zscore};
use contango_traits::params::ensure_positive;
use contango_traits::types::code_column;
use contango_traits::{BasisSeries, Result, Transform, columns};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Directional position implied by the basis z-score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSignal {
    /// Basis abnormally wide: sell futures, buy spot.
    ShortFutures,
    /// No position.
    #[default]
    Hold,
    /// Basis abnormally negative: buy futures, sell spot.
    LongFutures,
}

impl TradeSignal {
    /// Integer code stored in the `signal` column.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::ShortFutures => -1,
            Self::Hold => 0,
            Self::LongFutures => 1,
        }
    }

    /// Inverse of [`TradeSignal::code`].
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::ShortFutures),
            0 => Some(Self::Hold),
            1 => Some(Self::LongFutures),
            _ => None,
        }
    }

    /// The opposite direction; `Hold` maps to itself.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::ShortFutures => Self::LongFutures,
            Self::Hold => Self::Hold,
            Self::LongFutures => Self::ShortFutures,
        }
    }

    /// Position direction as a float multiplier.
    #[must_use]
    pub const fn direction(&self) -> f64 {
        self.code() as f64
    }
}

/// Configuration for signal generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Absolute z-score beyond which a position is taken (default: 2.0).
    pub zscore_threshold: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            zscore_threshold: 2.0,
        }
    }
}

impl SignalConfig {
    /// Checks that the threshold is positive.
    ///
    /// # Errors
    ///
    /// Fails for a zero, negative or non-finite threshold.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("zscore_threshold", self.zscore_threshold)
    }
}

/// Maps each z-score to a signal. Undefined z-scores hold.
///
/// # Errors
///
/// Fails for a non-positive threshold.
pub fn generate_signal(zscores: &[Option<f64>], threshold: f64) -> Result<Vec<TradeSignal>> {
    ensure_positive("zscore_threshold", threshold)?;
    Ok(zscores
        .iter()
        .map(|z| match z {
            Some(z) if *z > threshold => TradeSignal::ShortFutures,
            Some(z) if *z < -threshold => TradeSignal::LongFutures,
            _ => TradeSignal::Hold,
        })
        .collect())
}

/// Transform writing `signal`.
///
/// Reads `basis_zscore` when present; otherwise the z-score is computed from
/// `basis_percent` with `zscore` and is not stored.
#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    config: SignalConfig,
    zscore: ZScoreConfig,
}

impl SignalGenerator {
    /// Create a new signal generator with the given configuration.
    #[must_use]
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            zscore: ZScoreConfig::default(),
        }
    }

    /// Set the z-score configuration used when `basis_zscore` is absent.
    #[must_use]
    pub const fn with_zscore(mut self, zscore: ZScoreConfig) -> Self {
        self.zscore = zscore;
        self
    }

    /// Get the z-score threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.config.zscore_threshold
    }

    fn zscores(&self, series: &BasisSeries) -> Result<Vec<Option<f64>>> {
        if series.has_column(columns::BASIS_ZSCORE) {
            return series.values(columns::BASIS_ZSCORE);
        }
        debug!(
            window = self.zscore.window,
            "basis_zscore absent, computing it for signal generation"
        );
        basis_zscore(&series.values(columns::BASIS_PERCENT)?, self.zscore.window)
    }
}

impl Transform for SignalGenerator {
    fn name(&self) -> &str {
        "signal"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::BASIS_PERCENT]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::SIGNAL]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        self.config.validate()?;
        let signals = generate_signal(&self.zscores(series)?, self.config.zscore_threshold)?;
        Ok(vec![code_column(
            columns::SIGNAL,
            signals.iter().map(TradeSignal::code).collect(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::BasisZScore;
    use crate::spread::BasisSpread;
    use contango_traits::SamplingInterval;

    #[test]
    fn test_default_config() {
        assert_eq!(SignalGenerator::default().threshold(), 2.0);
    }

    #[test]
    fn test_threshold_mapping() {
        let z = [Some(2.5), Some(-2.5), Some(2.0), Some(-2.0), Some(0.3), None];
        let signals = generate_signal(&z, 2.0).unwrap();
        assert_eq!(
            signals,
            vec![
                TradeSignal::ShortFutures,
                TradeSignal::LongFutures,
                TradeSignal::Hold,
                TradeSignal::Hold,
                TradeSignal::Hold,
                TradeSignal::Hold,
            ]
        );
    }

    #[test]
    fn test_antisymmetry() {
        let z = [Some(3.1), Some(-1.7), None, Some(-4.0), Some(1.5), Some(0.0), Some(1.6)];
        let negated: Vec<Option<f64>> = z.iter().map(|v| v.map(|x| -x)).collect();

        let forward = generate_signal(&z, 1.5).unwrap();
        let backward = generate_signal(&negated, 1.5).unwrap();

        for (a, b) in forward.iter().zip(&backward) {
            assert_eq!(a.opposite(), *b);
            assert_eq!(a.code(), -b.code());
        }
    }

    #[test]
    fn test_non_positive_threshold_rejected() {
        assert!(generate_signal(&[Some(1.0)], 0.0).is_err());
        assert!(generate_signal(&[Some(1.0)], -1.0).is_err());
    }

    #[test]
    fn test_codes_roundtrip() {
        for s in [
            TradeSignal::ShortFutures,
            TradeSignal::Hold,
            TradeSignal::LongFutures,
        ] {
            assert_eq!(TradeSignal::from_code(s.code()), Some(s));
        }
        assert_eq!(TradeSignal::from_code(2), None);
    }

    fn sample_series() -> BasisSeries {
        let spot = vec![100.0; 8];
        let futures = vec![101.0, 101.0, 101.0, 101.0, 101.0, 101.0, 101.0, 110.0];
        let mut series =
            BasisSeries::from_aligned(SamplingInterval::DAILY, (0..8).collect(), spot, futures)
                .unwrap();
        series.apply(&BasisSpread).unwrap();
        series
    }

    #[test]
    fn test_computes_zscore_when_absent() {
        let mut series = sample_series();
        let generator = SignalGenerator::new(SignalConfig {
            zscore_threshold: 1.5,
        })
        .with_zscore(ZScoreConfig { window: 3 });
        series.apply(&generator).unwrap();

        assert!(!series.has_column(columns::BASIS_ZSCORE));
        let codes = series.codes(columns::SIGNAL).unwrap();
        // flat windows are undefined; window [1, 1, 10] gives z = 6 / sqrt(27) < 1.5
        assert_eq!(codes, vec![Some(0); 8]);
    }

    #[test]
    fn test_uses_existing_zscore() {
        let mut series = sample_series();
        series
            .apply(&BasisZScore::new(ZScoreConfig { window: 4 }))
            .unwrap();
        series
            .apply(&SignalGenerator::new(SignalConfig {
                zscore_threshold: 1.4,
            }))
            .unwrap();

        // window [1, 1, 1, 10]: mean 3.25, std 4.5, z = 1.5
        let codes = series.codes(columns::SIGNAL).unwrap();
        assert_eq!(codes[7], Some(-1));
        assert!(codes[..7].iter().all(|c| *c == Some(0)));
    }
}
