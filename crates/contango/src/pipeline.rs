//! End-to-end analysis pipeline.
//!
//! [`analyze`] is the single entry point: it aligns the two price series,
//! applies every transform in dependency order and collects the diagnostics.
//! All parameters travel in one explicit [`AnalysisConfig`].

use contango_eval::{BacktestConfig, BacktestReport, Backtester, ReportSnapshot};
use contango_signals::indicators::{
    BasisMomentum, BasisZScore, MomentumConfig, VolatilityAdjustedBasis, VolatilityConfig,
    ZScoreConfig,
};
use contango_signals::regime::{RegimeClassification, RegimeDetector};
use contango_signals::spread::{AnnualizedBasis, AnnualizedBasisConfig, BasisSpread};
use contango_signals::trading::{
    PositionSizer, PositionSizingConfig, SignalConfig, SignalGenerator,
};
use contango_traits::{
    AlignmentPolicy, BasisSeries, CleaningReport, PriceSeries, Result, SamplingInterval,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Parameters of one analysis run.
///
/// Every field has a default, so a partial JSON document deserializes into a
/// complete configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How spot and futures timestamps are matched (default: inner join)
    pub policy: AlignmentPolicy,
    /// Annualized basis parameters
    pub annualized: AnnualizedBasisConfig,
    /// Z-score parameters
    pub zscore: ZScoreConfig,
    /// Momentum parameters
    pub momentum: MomentumConfig,
    /// Volatility-adjusted basis parameters
    pub volatility: VolatilityConfig,
    /// Signal parameters, also used for the report's z-score breach check
    pub signal: SignalConfig,
    /// Position sizing parameters
    pub sizing: PositionSizingConfig,
    /// Backtest parameters
    pub backtest: BacktestConfig,
    /// Write the `signal` column
    pub generate_signals: bool,
    /// Write the `position_size` column
    pub size_positions: bool,
    /// Run the backtest; needs `generate_signals`, since the backtest
    /// trades the `signal` column
    pub run_backtest: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            policy: AlignmentPolicy::default(),
            annualized: AnnualizedBasisConfig::default(),
            zscore: ZScoreConfig::default(),
            momentum: MomentumConfig::default(),
            volatility: VolatilityConfig::default(),
            signal: SignalConfig::default(),
            sizing: PositionSizingConfig::default(),
            backtest: BacktestConfig::default(),
            generate_signals: true,
            size_positions: true,
            run_backtest: true,
        }
    }
}

impl AnalysisConfig {
    /// Validates every stage's parameters up front.
    ///
    /// # Errors
    ///
    /// Returns the first [`contango_traits::ContangoError::InvalidParameter`]
    /// found.
    pub fn validate(&self) -> Result<()> {
        self.annualized.validate()?;
        self.zscore.validate()?;
        self.momentum.validate()?;
        self.volatility.validate()?;
        self.signal.validate()?;
        self.sizing.validate()?;
        self.backtest.validate()
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The finished table
    pub series: BasisSeries,
    /// What alignment dropped
    pub cleaning: CleaningReport,
    /// Regime thresholds and transition count
    pub regime: RegimeClassification,
    /// Backtest diagnostics, when the backtest ran
    pub backtest: Option<BacktestReport>,
    /// Latest-row report data
    pub snapshot: ReportSnapshot,
}

impl Analysis {
    /// Sampling interval of the run.
    #[must_use]
    pub const fn interval(&self) -> SamplingInterval {
        self.series.interval()
    }
}

/// Runs the full analysis for one sampling interval.
///
/// # Errors
///
/// - [`contango_traits::ContangoError::InvalidParameter`] for a bad
///   configuration, before any data is touched
/// - [`contango_traits::ContangoError::Alignment`] if the series do not
///   overlap
pub fn analyze(
    interval: SamplingInterval,
    spot: &PriceSeries,
    futures: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<Analysis> {
    config.validate()?;

    let (mut series, cleaning) = BasisSeries::align(interval, spot, futures, config.policy)?;
    info!(
        %interval,
        rows = series.len(),
        policy = %config.policy,
        "aligned spot and futures"
    );

    series.apply(&BasisSpread)?;
    series.apply(&AnnualizedBasis::new(config.annualized.clone()))?;
    series.apply(&BasisZScore::new(config.zscore.clone()))?;
    series.apply(&BasisMomentum::new(config.momentum.clone()))?;
    series.apply(&VolatilityAdjustedBasis::new(config.volatility.clone()))?;
    let regime = RegimeDetector.detect(&mut series)?;

    if config.generate_signals {
        series.apply(
            &SignalGenerator::new(config.signal.clone()).with_zscore(config.zscore.clone()),
        )?;
    }
    if config.size_positions {
        series.apply(&PositionSizer::new(config.sizing.clone()))?;
    }
    if config.run_backtest && !config.generate_signals {
        warn!("signals disabled, skipping backtest");
    }
    let backtest = if config.run_backtest && config.generate_signals {
        let backtester = Backtester::new(config.backtest.clone())
            .with_signal(config.signal.clone(), config.zscore.clone());
        Some(backtester.run(&mut series)?)
    } else {
        None
    };

    let snapshot = ReportSnapshot::from_series(&series, config.signal.zscore_threshold)?;

    Ok(Analysis {
        series,
        cleaning,
        regime,
        backtest,
        snapshot,
    })
}

/// One independent analysis job.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Sampling interval of both series
    pub interval: SamplingInterval,
    /// Spot closes
    pub spot: PriceSeries,
    /// Futures closes
    pub futures: PriceSeries,
}

/// Runs every job with the same configuration.
///
/// A job whose series do not overlap is skipped with a warning; any other
/// error aborts the batch.
///
/// # Errors
///
/// Propagates the first non-alignment error.
pub fn analyze_batch(jobs: &[BatchJob], config: &AnalysisConfig) -> Result<Vec<Analysis>> {
    config.validate()?;
    let mut out = Vec::with_capacity(jobs.len());
    for job in jobs {
        match analyze(job.interval, &job.spot, &job.futures, config) {
            Ok(analysis) => out.push(analysis),
            Err(e) if e.is_alignment() => {
                warn!(interval = %job.interval, error = %e, "skipping interval");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use contango_traits::{ContangoError, columns};

    const HOUR_MS: i64 = 3_600_000;

    fn prices(n: usize, f: impl Fn(usize) -> f64) -> PriceSeries {
        let ts: Vec<i64> = (0..n as i64).map(|i| i * HOUR_MS).collect();
        let closes: Vec<f64> = (0..n).map(f).collect();
        PriceSeries::from_parts(&ts, &closes).unwrap()
    }

    fn spot() -> PriceSeries {
        prices(60, |i| 30_000.0 + (i as f64 * 0.7).sin() * 150.0 + i as f64 * 5.0)
    }

    fn futures() -> PriceSeries {
        prices(60, |i| {
            30_060.0
                + (i as f64 * 0.7).sin() * 150.0
                + i as f64 * 5.0
                + (i as f64 * 1.3).cos() * 40.0
        })
    }

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.policy, AlignmentPolicy::InnerJoin);
        assert!(config.generate_signals && config.size_positions && config.run_backtest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_config() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"zscore": {"window": 10}, "run_backtest": false}"#).unwrap();
        assert_eq!(config.zscore.window, 10);
        assert!(!config.run_backtest);
        assert_eq!(config.momentum.window, 14);
        assert_relative_eq!(config.signal.zscore_threshold, 2.0);
    }

    #[test]
    fn test_full_pipeline() {
        let analysis = analyze(
            SamplingInterval::HOURLY,
            &spot(),
            &futures(),
            &AnalysisConfig::default(),
        )
        .unwrap();

        let series = &analysis.series;
        assert_eq!(series.len(), 60);
        for name in [
            columns::BASIS,
            columns::BASIS_PERCENT,
            columns::ANNUALIZED_BASIS,
            columns::BASIS_ZSCORE,
            columns::BASIS_MOMENTUM,
            columns::SPOT_VOLATILITY,
            columns::VOL_ADJUSTED_BASIS,
            columns::MARKET_REGIME,
            columns::SIGNAL,
            columns::POSITION_SIZE,
            columns::STRATEGY_RETURN,
            columns::EQUITY,
        ] {
            assert!(series.has_column(name), "missing {name}");
        }

        let z = series.values(columns::BASIS_ZSCORE).unwrap();
        assert!(z[..29].iter().all(Option::is_none));
        assert!(z[29].is_some());

        assert!(analysis.regime.is_classified());
        assert!(analysis.backtest.is_some());
        assert_eq!(analysis.snapshot.interval, "1hour");
        assert_eq!(analysis.cleaning.rows, 60);
    }

    #[test]
    fn test_disabled_signals_skip_backtest() {
        let config = AnalysisConfig {
            generate_signals: false,
            ..Default::default()
        };
        let analysis = analyze(SamplingInterval::HOURLY, &spot(), &futures(), &config).unwrap();
        assert!(!analysis.series.has_column(columns::SIGNAL));
        assert!(!analysis.series.has_column(columns::EQUITY));
        assert!(analysis.backtest.is_none());
        assert!(analysis.series.has_column(columns::POSITION_SIZE));
    }

    #[test]
    fn test_stage_toggles() {
        let config = AnalysisConfig {
            size_positions: false,
            run_backtest: false,
            ..Default::default()
        };
        let analysis = analyze(SamplingInterval::HOURLY, &spot(), &futures(), &config).unwrap();
        assert!(analysis.series.has_column(columns::SIGNAL));
        assert!(!analysis.series.has_column(columns::POSITION_SIZE));
        assert!(!analysis.series.has_column(columns::EQUITY));
        assert!(analysis.backtest.is_none());
    }

    #[test]
    fn test_invalid_parameter_is_fatal() {
        let mut config = AnalysisConfig::default();
        config.annualized.days_to_maturity = 0;
        let err = analyze(SamplingInterval::HOURLY, &spot(), &futures(), &config).unwrap_err();
        assert!(matches!(err, ContangoError::InvalidParameter { .. }));
    }

    #[test]
    fn test_batch_skips_non_overlapping_interval() {
        let late =
            PriceSeries::from_parts(&[1_000 * HOUR_MS, 1_001 * HOUR_MS], &[1.0, 1.0]).unwrap();
        let jobs = vec![
            BatchJob {
                interval: SamplingInterval::HOURLY,
                spot: spot(),
                futures: futures(),
            },
            BatchJob {
                interval: SamplingInterval::DAILY,
                spot: spot(),
                futures: late,
            },
        ];
        let results = analyze_batch(&jobs, &AnalysisConfig::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].interval(), SamplingInterval::HOURLY);
    }

    #[test]
    fn test_batch_propagates_parameter_errors() {
        let mut config = AnalysisConfig::default();
        config.sizing.max_risk_per_trade = 2.0;
        let jobs = vec![BatchJob {
            interval: SamplingInterval::HOURLY,
            spot: spot(),
            futures: futures(),
        }];
        assert!(analyze_batch(&jobs, &config).is_err());
    }
}
