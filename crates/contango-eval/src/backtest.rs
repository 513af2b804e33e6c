//! Basis strategy backtester.
//!
//! The strategy holds `signal(t-1)` over period `t` and earns the percent
//! change of `basis_percent`, which stands in for a tradable spread return.
//! Every change of signal is charged a flat proportional cost.

use contango_signals::TradeSignal;
use contango_signals::indicators::ZScoreConfig;
use contango_signals::trading::{SignalConfig, SignalGenerator};
use contango_traits::params::{ensure_positive, ensure_rate};
use contango_traits::stats::{MIN_STD_THRESHOLD, defined, pct_change, sample_std};
use contango_traits::types::float_column;
use contango_traits::{
    BasisSeries, ContangoError, Result, TRADING_DAYS_PER_YEAR, Transform, columns,
};
use polars::prelude::Column;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Backtesting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Initial capital (default: 10000)
    pub initial_capital: f64,
    /// Cost charged on every signal change, as a fraction (default: 0.001)
    pub transaction_cost: f64,
    /// Periods per year used to annualize the Sharpe ratio (default: 252)
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            transaction_cost: 0.001,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl BacktestConfig {
    /// Checks capital, cost rate and annualization factor.
    ///
    /// # Errors
    ///
    /// Fails for non-positive capital, a cost outside `[0, 1)` or a
    /// non-positive periods-per-year.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("initial_capital", self.initial_capital)?;
        ensure_rate("transaction_cost", self.transaction_cost)?;
        ensure_positive("periods_per_year", self.periods_per_year)
    }
}

/// Summary diagnostics of a backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Capital at the start
    pub initial_capital: f64,
    /// Equity at the last row
    pub final_equity: f64,
    /// `final_equity / initial_capital - 1`
    pub total_return: f64,
    /// Number of rows where the signal changed
    pub trade_count: usize,
    /// Fraction of trade rows with positive net return, 0 without trades
    pub win_rate: f64,
    /// Annualized Sharpe ratio of defined net returns
    pub sharpe_ratio: Option<f64>,
    /// Maximum drawdown of the cumulative return curve
    pub max_drawdown: f64,
    /// Sum of transaction costs charged
    pub total_transaction_costs: f64,
    /// Number of simulated periods
    pub periods: usize,
}

impl BacktestReport {
    /// Calculate the annualized Sharpe ratio of a return series.
    ///
    /// Returns `None` with fewer than two returns or zero dispersion.
    #[must_use]
    pub fn calculate_sharpe(returns: &[f64], periods_per_year: f64) -> Option<f64> {
        let std = sample_std(returns)?;
        if std <= MIN_STD_THRESHOLD {
            return None;
        }
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        Some(mean / std * periods_per_year.sqrt())
    }

    /// Calculate maximum drawdown of a cumulative return curve.
    #[must_use]
    pub fn calculate_max_drawdown(cumulative_returns: &[f64]) -> f64 {
        let mut max_dd = 0.0;
        let mut peak = 0.0;

        for &cum_ret in cumulative_returns {
            if cum_ret > peak {
                peak = cum_ret;
            }
            let dd = (peak - cum_ret) / (1.0 + peak);
            if dd > max_dd {
                max_dd = dd;
            }
        }

        max_dd
    }
}

/// Per-row output of a backtest, one entry per row of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRun {
    /// `signal(t-1) * basis_return(t)`
    pub strategy_return: Vec<Option<f64>>,
    /// Cost charged at each row
    pub transaction_costs: Vec<f64>,
    /// `strategy_return - transaction_costs`
    pub net_return: Vec<Option<f64>>,
    /// Compounded net return, undefined rows counting as zero
    pub cumulative_return: Vec<f64>,
    /// `initial_capital * (1 + cumulative_return)`
    pub equity: Vec<f64>,
    /// Diagnostics
    pub report: BacktestReport,
}

impl BacktestRun {
    /// Output columns in `columns` order.
    #[must_use]
    pub fn to_columns(&self) -> Vec<Column> {
        vec![
            float_column(columns::STRATEGY_RETURN, self.strategy_return.clone()),
            float_column(
                columns::TRANSACTION_COSTS,
                self.transaction_costs.iter().copied().map(Some).collect(),
            ),
            float_column(columns::NET_RETURN, self.net_return.clone()),
            float_column(
                columns::CUMULATIVE_RETURN,
                self.cumulative_return.iter().copied().map(Some).collect(),
            ),
            float_column(
                columns::EQUITY,
                self.equity.iter().copied().map(Some).collect(),
            ),
        ]
    }
}

/// Backtesting engine.
#[derive(Debug, Clone, Default)]
pub struct Backtester {
    config: BacktestConfig,
    signal: SignalConfig,
    zscore: ZScoreConfig,
}

impl Backtester {
    /// Create a new backtester with configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use contango_eval::{Backtester, BacktestConfig};
    ///
    /// let backtester = Backtester::new(BacktestConfig::default());
    /// let report = backtester.run(&mut series)?;
    /// println!("Win Rate: {:.2}%", report.win_rate * 100.0);
    /// ```
    #[must_use]
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the parameters used to generate `signal` when it is absent.
    #[must_use]
    pub const fn with_signal(mut self, signal: SignalConfig, zscore: ZScoreConfig) -> Self {
        self.signal = signal;
        self.zscore = zscore;
        self
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Simulates the strategy over aligned `basis_percent` and signal slices.
    ///
    /// Pure: the same inputs always produce the same run.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, mismatched lengths or empty input.
    pub fn simulate(
        &self,
        basis_percent: &[Option<f64>],
        signals: &[TradeSignal],
    ) -> Result<BacktestRun> {
        self.config.validate()?;
        if basis_percent.len() != signals.len() {
            return Err(ContangoError::InvalidData(format!(
                "basis_percent has {} rows, signal has {}",
                basis_percent.len(),
                signals.len()
            )));
        }
        if signals.is_empty() {
            return Err(ContangoError::InsufficientData(
                "backtest needs at least one row".to_string(),
            ));
        }

        let n = signals.len();
        let basis_return = pct_change(basis_percent);

        let mut strategy_return = Vec::with_capacity(n);
        let mut transaction_costs = Vec::with_capacity(n);
        let mut net_return = Vec::with_capacity(n);
        let mut cumulative_return = Vec::with_capacity(n);
        let mut equity = Vec::with_capacity(n);

        let mut growth = 1.0;
        let mut trade_count = 0;
        let mut wins = 0;

        for t in 0..n {
            let held = t.checked_sub(1).map(|p| signals[p]);

            let strategy = held.zip(basis_return[t]).map(|(s, r)| s.direction() * r);
            let traded = held.is_some_and(|prev| prev != signals[t]);
            let cost = if traded { self.config.transaction_cost } else { 0.0 };
            let net = strategy.map(|r| r - cost);

            growth *= 1.0 + net.unwrap_or(0.0);
            let cum = growth - 1.0;

            if traded {
                trade_count += 1;
                if net.is_some_and(|r| r > 0.0) {
                    wins += 1;
                }
            }

            strategy_return.push(strategy);
            transaction_costs.push(cost);
            net_return.push(net);
            cumulative_return.push(cum);
            equity.push(self.config.initial_capital * (1.0 + cum));
        }

        let final_equity = equity.last().copied().unwrap_or(self.config.initial_capital);
        let report = BacktestReport {
            initial_capital: self.config.initial_capital,
            final_equity,
            total_return: final_equity / self.config.initial_capital - 1.0,
            trade_count,
            win_rate: if trade_count > 0 {
                wins as f64 / trade_count as f64
            } else {
                0.0
            },
            sharpe_ratio: BacktestReport::calculate_sharpe(
                &defined(&net_return),
                self.config.periods_per_year,
            ),
            max_drawdown: BacktestReport::calculate_max_drawdown(&cumulative_return),
            total_transaction_costs: transaction_costs.iter().sum(),
            periods: n,
        };

        Ok(BacktestRun {
            strategy_return,
            transaction_costs,
            net_return,
            cumulative_return,
            equity,
            report,
        })
    }

    /// Runs the backtest on a series, writing the result columns.
    ///
    /// Generates `signal` first if the series has none.
    ///
    /// # Errors
    ///
    /// Fails if `basis_percent` is missing, the signal column holds an
    /// unknown code, or the configuration is invalid.
    pub fn run(&self, series: &mut BasisSeries) -> Result<BacktestReport> {
        series.require(&[columns::BASIS_PERCENT])?;
        if !series.has_column(columns::SIGNAL) {
            series.apply(
                &SignalGenerator::new(self.signal.clone()).with_zscore(self.zscore.clone()),
            )?;
        }

        let run = self.simulate_series(series)?;
        for column in run.to_columns() {
            series.set_column(column)?;
        }

        let r = &run.report;
        info!(
            interval = %series.interval(),
            total_return = r.total_return,
            trades = r.trade_count,
            win_rate = r.win_rate,
            max_drawdown = r.max_drawdown,
            "backtest complete"
        );
        Ok(run.report)
    }

    fn simulate_series(&self, series: &BasisSeries) -> Result<BacktestRun> {
        let basis_percent = series.values(columns::BASIS_PERCENT)?;
        let signals = read_signals(series)?;
        self.simulate(&basis_percent, &signals)
    }
}

/// Reads `signal` codes, treating undefined cells as hold.
fn read_signals(series: &BasisSeries) -> Result<Vec<TradeSignal>> {
    series
        .codes(columns::SIGNAL)?
        .into_iter()
        .map(|code| match code {
            None => Ok(TradeSignal::Hold),
            Some(c) => TradeSignal::from_code(c)
                .ok_or_else(|| ContangoError::InvalidData(format!("unknown signal code {c}"))),
        })
        .collect()
}

impl Transform for Backtester {
    fn name(&self) -> &str {
        "backtest"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::BASIS_PERCENT, columns::SIGNAL]
    }

    fn output_columns(&self) -> &[&str] {
        &[
            columns::STRATEGY_RETURN,
            columns::TRANSACTION_COSTS,
            columns::NET_RETURN,
            columns::CUMULATIVE_RETURN,
            columns::EQUITY,
        ]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        Ok(self.simulate_series(series)?.to_columns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use contango_signals::spread::BasisSpread;
    use contango_traits::SamplingInterval;

    fn signals(codes: &[i32]) -> Vec<TradeSignal> {
        codes
            .iter()
            .map(|c| TradeSignal::from_code(*c).unwrap())
            .collect()
    }

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_default_config() {
        let config = BacktestConfig::default();
        assert_relative_eq!(config.initial_capital, 10_000.0);
        assert_relative_eq!(config.transaction_cost, 0.001);
        assert_relative_eq!(config.periods_per_year, 252.0);
    }

    #[test]
    fn test_costs_charged_on_signal_changes() {
        let basis = some(&[1.0, 1.1, 1.2, 1.0, 0.9, 1.0]);
        let run = Backtester::default()
            .simulate(&basis, &signals(&[0, 1, 1, -1, -1, 0]))
            .unwrap();

        assert_eq!(run.transaction_costs, vec![0.0, 0.001, 0.0, 0.001, 0.0, 0.001]);
        assert_eq!(run.report.trade_count, 3);
        assert_relative_eq!(run.report.total_transaction_costs, 0.003, epsilon = 1e-15);
    }

    #[test]
    fn test_strategy_returns_use_previous_signal() {
        // basis returns: -, 0.1, -0.5, 1.0
        let basis = some(&[1.0, 1.1, 0.55, 1.1]);
        let run = Backtester::new(BacktestConfig {
            transaction_cost: 0.0,
            ..Default::default()
        })
        .simulate(&basis, &signals(&[1, -1, -1, 0]))
        .unwrap();

        assert_eq!(run.strategy_return[0], None);
        assert_relative_eq!(run.strategy_return[1].unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(run.strategy_return[2].unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(run.strategy_return[3].unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_equity_compounds_net_returns() {
        let basis = some(&[1.0, 1.1, 1.21]);
        let config = BacktestConfig {
            initial_capital: 1_000.0,
            transaction_cost: 0.01,
            ..Default::default()
        };
        let run = Backtester::new(config)
            .simulate(&basis, &signals(&[1, 1, 0]))
            .unwrap();

        // net: undefined, +0.1, +0.1 - 0.01
        assert_eq!(run.net_return[0], None);
        assert_relative_eq!(run.cumulative_return[0], 0.0);
        assert_relative_eq!(run.cumulative_return[2], 1.1 * 1.09 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(run.equity[2], 1_000.0 * 1.1 * 1.09, epsilon = 1e-9);
        assert_relative_eq!(
            run.report.total_return,
            run.equity[2] / 1_000.0 - 1.0,
            epsilon = 1e-12
        );
        assert_eq!(run.report.trade_count, 1);
        assert_relative_eq!(run.report.win_rate, 1.0);
    }

    #[test]
    fn test_no_look_ahead() {
        let basis = some(&[1.0, 1.2, 0.9, 1.5, 1.4, 1.8]);
        let base = signals(&[1, 0, -1, 1, 0, -1]);
        let baseline = Backtester::default().simulate(&basis, &base).unwrap();

        for t in 0..base.len() - 1 {
            let mut perturbed = base.clone();
            perturbed[t + 1] = perturbed[t + 1].opposite();
            if perturbed[t + 1] == TradeSignal::Hold {
                perturbed[t + 1] = TradeSignal::LongFutures;
            }
            let run = Backtester::default().simulate(&basis, &perturbed).unwrap();
            assert_eq!(run.strategy_return[..=t], baseline.strategy_return[..=t]);
        }
    }

    #[test]
    fn test_undefined_returns_tolerated() {
        // basis passes through zero, so the next return is undefined
        let basis = vec![Some(1.0), Some(0.0), Some(1.0), None, Some(2.0)];
        let run = Backtester::default()
            .simulate(&basis, &signals(&[1, 1, 1, 1, 1]))
            .unwrap();

        assert_eq!(run.strategy_return[2], None);
        assert_eq!(run.strategy_return[3], None);
        assert_eq!(run.strategy_return[4], None);
        assert!(run.equity.iter().all(|e| e.is_finite()));
        assert_eq!(run.report.trade_count, 0);
        assert_relative_eq!(run.report.win_rate, 0.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Backtester::default()
            .simulate(&some(&[1.0, 2.0]), &signals(&[0]))
            .unwrap_err();
        assert!(matches!(err, ContangoError::InvalidData(_)));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let backtester = Backtester::new(BacktestConfig {
            transaction_cost: 1.0,
            ..Default::default()
        });
        let err = backtester
            .simulate(&some(&[1.0]), &signals(&[0]))
            .unwrap_err();
        assert!(matches!(
            err,
            ContangoError::InvalidParameter {
                name: "transaction_cost",
                ..
            }
        ));
    }

    #[test]
    fn test_calculate_sharpe() {
        let sharpe = BacktestReport::calculate_sharpe(&[0.01, 0.03], 4.0).unwrap();
        // mean 0.02, std 0.01 * sqrt(2)
        assert_relative_eq!(sharpe, 0.02 / (0.01 * 2.0_f64.sqrt()) * 2.0, epsilon = 1e-9);
        assert_eq!(BacktestReport::calculate_sharpe(&[0.01], 252.0), None);
        assert_eq!(BacktestReport::calculate_sharpe(&[0.01, 0.01], 252.0), None);
    }

    #[test]
    fn test_calculate_max_drawdown() {
        let dd = BacktestReport::calculate_max_drawdown(&[0.0, 0.5, 0.2, 0.8, 0.35]);
        // peak 0.8 -> 0.35: 0.45 / 1.8
        assert_relative_eq!(dd, 0.25, epsilon = 1e-12);
        assert_relative_eq!(BacktestReport::calculate_max_drawdown(&[0.0, 0.1, 0.2]), 0.0);
    }

    fn series() -> BasisSeries {
        let spot = vec![100.0; 40];
        let futures: Vec<f64> = (0..40)
            .map(|i| 101.0 + ((i * 7) % 11) as f64 * 0.1 + if i == 35 { 3.0 } else { 0.0 })
            .collect();
        let mut series =
            BasisSeries::from_aligned(SamplingInterval::DAILY, (0..40).collect(), spot, futures)
                .unwrap();
        series.apply(&BasisSpread).unwrap();
        series
    }

    #[test]
    fn test_run_generates_signal_and_writes_columns() {
        let mut series = series();
        let report = Backtester::default().run(&mut series).unwrap();

        assert!(series.has_column(columns::SIGNAL));
        assert!(!series.has_column(columns::BASIS_ZSCORE));
        for name in Backtester::default().output_columns() {
            assert!(series.has_column(name));
        }
        assert_eq!(report.periods, 40);
        let equity = series.values(columns::EQUITY).unwrap();
        assert_relative_eq!(
            equity[39].unwrap(),
            report.final_equity,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_run_is_idempotent() {
        let mut series = series();
        let backtester = Backtester::default();
        let first = backtester.run(&mut series).unwrap();
        let equity_first = series.values(columns::EQUITY).unwrap();
        let second = backtester.run(&mut series).unwrap();
        let equity_second = series.values(columns::EQUITY).unwrap();

        assert_eq!(first, second);
        assert_eq!(equity_first, equity_second);
    }

    #[test]
    fn test_unknown_signal_code_rejected() {
        let mut series = series();
        series
            .set_column(contango_traits::types::code_column(columns::SIGNAL, vec![3; 40]))
            .unwrap();
        let err = Backtester::default().run(&mut series).unwrap_err();
        assert!(matches!(err, ContangoError::InvalidData(_)));
    }
}
