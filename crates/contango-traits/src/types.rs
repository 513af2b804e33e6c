//! Common types used throughout the contango engine.
//!
//! This module defines the input price series and the [`BasisSeries`] table
//! the analytics transforms read from and append columns to.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use tracing::debug;

use crate::align::{self, AlignmentPolicy, CleaningReport};
use crate::stats::finite;
use crate::{ContangoError, Result, SamplingInterval, Transform};

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// Column names of a [`BasisSeries`].
pub mod columns {
    /// Sample timestamp in epoch milliseconds.
    pub const TIMESTAMP: &str = "timestamp";
    /// Spot close price.
    pub const SPOT_PRICE: &str = "spot_price";
    /// Futures close price.
    pub const FUTURES_PRICE: &str = "futures_price";
    /// `futures_price - spot_price`.
    pub const BASIS: &str = "basis";
    /// Basis as a percentage of spot.
    pub const BASIS_PERCENT: &str = "basis_percent";
    /// Basis annualized over the time to maturity, in percent.
    pub const ANNUALIZED_BASIS: &str = "annualized_basis";
    /// Rolling z-score of `basis_percent`.
    pub const BASIS_ZSCORE: &str = "basis_zscore";
    /// Rolling sum of `basis_percent` changes.
    pub const BASIS_MOMENTUM: &str = "basis_momentum";
    /// Annualized rolling volatility of spot returns.
    pub const SPOT_VOLATILITY: &str = "spot_volatility";
    /// `basis_percent / spot_volatility`.
    pub const VOL_ADJUSTED_BASIS: &str = "vol_adjusted_basis";
    /// Market regime code (0 backwardation, 1 neutral, 2 contango).
    pub const MARKET_REGIME: &str = "market_regime";
    /// Trading signal code (-1, 0, 1).
    pub const SIGNAL: &str = "signal";
    /// ATR-normalized position size.
    pub const POSITION_SIZE: &str = "position_size";
    /// Gross strategy return per period.
    pub const STRATEGY_RETURN: &str = "strategy_return";
    /// Transaction cost charged per period.
    pub const TRANSACTION_COSTS: &str = "transaction_costs";
    /// Strategy return net of costs.
    pub const NET_RETURN: &str = "net_return";
    /// Compounded net return to date.
    pub const CUMULATIVE_RETURN: &str = "cumulative_return";
    /// Equity curve.
    pub const EQUITY: &str = "equity";
}

/// A single close-price observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Observation time in epoch milliseconds.
    pub timestamp: TimestampMs,
    /// Close price.
    pub close: f64,
}

impl PricePoint {
    /// Create a new observation.
    #[must_use]
    pub const fn new(timestamp: TimestampMs, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// Whether the close is usable: finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// One instrument's close prices, sorted by strictly increasing timestamp.
///
/// Construction rejects unsorted or duplicate timestamps; the engine never
/// sorts on the caller's behalf. Prices are not validated here, bad closes
/// are dropped during alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a series from observations already sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`ContangoError::InvalidData`] if timestamps are not strictly
    /// increasing.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if let Some(pos) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(ContangoError::InvalidData(format!(
                "timestamps must be strictly increasing: {} follows {} at row {}",
                points[pos + 1].timestamp,
                points[pos].timestamp,
                pos + 1
            )));
        }
        Ok(Self { points })
    }

    /// Creates a series from parallel timestamp and close vectors.
    ///
    /// # Errors
    ///
    /// Fails on a length mismatch or unsorted timestamps.
    pub fn from_parts(timestamps: &[TimestampMs], closes: &[f64]) -> Result<Self> {
        if timestamps.len() != closes.len() {
            return Err(ContangoError::InvalidData(format!(
                "{} timestamps but {} closes",
                timestamps.len(),
                closes.len()
            )));
        }
        Self::new(
            timestamps
                .iter()
                .zip(closes)
                .map(|(&t, &c)| PricePoint::new(t, c))
                .collect(),
        )
    }

    /// Reads a series from a frame with an integer timestamp column (epoch
    /// milliseconds) and a numeric close column.
    ///
    /// A null close becomes NaN and is later dropped as a data-quality defect.
    ///
    /// # Errors
    ///
    /// Fails if a column is missing or cannot be cast, a timestamp is null, or
    /// timestamps are unsorted.
    pub fn from_frame(df: &DataFrame, timestamp_col: &str, close_col: &str) -> Result<Self> {
        let ts = df
            .column(timestamp_col)
            .map_err(|_| ContangoError::MissingColumn(timestamp_col.to_string()))?
            .cast(&DataType::Int64)?;
        let close = df
            .column(close_col)
            .map_err(|_| ContangoError::MissingColumn(close_col.to_string()))?
            .cast(&DataType::Float64)?;

        let points = ts
            .as_materialized_series()
            .i64()?
            .into_iter()
            .zip(close.as_materialized_series().f64()?.into_iter())
            .map(|(t, c)| {
                t.map(|t| PricePoint::new(t, c.unwrap_or(f64::NAN)))
                    .ok_or_else(|| ContangoError::InvalidData("empty timestamp".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }

    /// The observations.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Builds a float column from optional cells.
#[must_use]
pub fn float_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::new(name.into(), values)
}

/// Builds an integer code column for categorical outputs.
#[must_use]
pub fn code_column(name: &str, values: Vec<i32>) -> Column {
    Column::new(name.into(), values)
}

/// The aligned table of spot price, futures price and derived columns.
///
/// A `BasisSeries` is built once per (spot, futures) pair and sampling
/// interval. Rows never change after construction; transforms only add or
/// overwrite their own columns through [`BasisSeries::apply`].
///
/// # Example
///
/// ```
/// use contango_traits::{BasisSeries, SamplingInterval, columns};
///
/// let series = BasisSeries::from_aligned(
///     SamplingInterval::DAILY,
///     vec![0, 86_400_000],
///     vec![100.0, 101.0],
///     vec![102.0, 101.5],
/// )
/// .unwrap();
///
/// assert_eq!(series.len(), 2);
/// assert!(series.has_column(columns::SPOT_PRICE));
/// ```
#[derive(Debug, Clone)]
pub struct BasisSeries {
    interval: SamplingInterval,
    data: DataFrame,
}

impl BasisSeries {
    /// Builds a series from already aligned vectors.
    ///
    /// # Errors
    ///
    /// - [`ContangoError::Alignment`] if there are no rows
    /// - [`ContangoError::InvalidData`] on length mismatch, unsorted timestamps
    ///   or a price that is not finite and strictly positive
    pub fn from_aligned(
        interval: SamplingInterval,
        timestamps: Vec<TimestampMs>,
        spot: Vec<f64>,
        futures: Vec<f64>,
    ) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(ContangoError::Alignment(
                "aligned series has no rows".to_string(),
            ));
        }
        if spot.len() != timestamps.len() || futures.len() != timestamps.len() {
            return Err(ContangoError::InvalidData(format!(
                "column lengths differ: {} timestamps, {} spot, {} futures",
                timestamps.len(),
                spot.len(),
                futures.len()
            )));
        }
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ContangoError::InvalidData(
                "timestamps must be strictly increasing".to_string(),
            ));
        }
        if let Some(bad) = spot
            .iter()
            .chain(futures.iter())
            .find(|p| !(p.is_finite() && **p > 0.0))
        {
            return Err(ContangoError::InvalidData(format!(
                "prices must be finite and positive, found {bad}"
            )));
        }

        let data = DataFrame::new(vec![
            Column::new(columns::TIMESTAMP.into(), timestamps),
            Column::new(columns::SPOT_PRICE.into(), spot),
            Column::new(columns::FUTURES_PRICE.into(), futures),
        ])?;

        Ok(Self { interval, data })
    }

    /// Aligns two price series under `policy` and builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`ContangoError::Alignment`] if nothing survives alignment.
    pub fn align(
        interval: SamplingInterval,
        spot: &PriceSeries,
        futures: &PriceSeries,
        policy: AlignmentPolicy,
    ) -> Result<(Self, CleaningReport)> {
        let (aligned, report) = align::align(spot, futures, policy)?;
        let series =
            Self::from_aligned(interval, aligned.timestamps, aligned.spot, aligned.futures)?;
        Ok((series, report))
    }

    /// The sampling interval this series was built for.
    #[must_use]
    pub const fn interval(&self) -> SamplingInterval {
        self.interval
    }

    /// Returns a reference to the underlying DataFrame.
    #[must_use]
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    #[must_use]
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the series has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the column names in insertion order.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }

    /// Fails with [`ContangoError::MissingColumn`] for the first absent name.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing column.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|n| !self.has_column(n)) {
            Some(missing) => Err(ContangoError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }

    fn get(&self, name: &str) -> Result<&Column> {
        self.data
            .column(name)
            .map_err(|_| ContangoError::MissingColumn(name.to_string()))
    }

    /// Sample timestamps in epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Fails only if the timestamp column was tampered with.
    pub fn timestamps(&self) -> Result<Vec<TimestampMs>> {
        let col = self.get(columns::TIMESTAMP)?;
        Ok(col.as_materialized_series().i64()?.into_iter().flatten().collect())
    }

    /// First and last sample time.
    ///
    /// # Errors
    ///
    /// Fails if the timestamp column is unreadable or out of chrono's range.
    pub fn time_range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let ts = self.timestamps()?;
        let to_utc = |ms: TimestampMs| {
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| ContangoError::InvalidData(format!("timestamp {ms} out of range")))
        };
        match (ts.first(), ts.last()) {
            (Some(&first), Some(&last)) => Ok((to_utc(first)?, to_utc(last)?)),
            _ => Err(ContangoError::InsufficientData("series has no rows".to_string())),
        }
    }

    /// Reads a column as optional floats. Nulls and non-finite values are
    /// both returned as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ContangoError::MissingColumn`] if the column is absent.
    pub fn values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.get(name)?.cast(&DataType::Float64)?;
        Ok(col
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.and_then(finite))
            .collect())
    }

    /// Reads a categorical code column.
    ///
    /// # Errors
    ///
    /// Returns [`ContangoError::MissingColumn`] if the column is absent.
    pub fn codes(&self, name: &str) -> Result<Vec<Option<i32>>> {
        let col = self.get(name)?.cast(&DataType::Int32)?;
        Ok(col.as_materialized_series().i32()?.into_iter().collect())
    }

    /// Adds a column, replacing any existing column of the same name.
    ///
    /// # Errors
    ///
    /// Fails if the column length differs from the row count, or if it would
    /// overwrite one of the three alignment columns.
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        let name = column.name().as_str();
        if [columns::TIMESTAMP, columns::SPOT_PRICE, columns::FUTURES_PRICE].contains(&name) {
            return Err(ContangoError::InvalidData(format!(
                "column `{name}` is fixed at construction"
            )));
        }
        if column.len() != self.len() {
            return Err(ContangoError::InvalidData(format!(
                "column `{name}` has {} rows, series has {}",
                column.len(),
                self.len()
            )));
        }
        self.data.with_column(column)?;
        Ok(())
    }

    /// Runs a transform and merges its output columns.
    ///
    /// Re-applying a transform overwrites the columns it produced earlier.
    ///
    /// # Errors
    ///
    /// Propagates missing inputs, invalid parameters and column errors.
    pub fn apply(&mut self, transform: &dyn Transform) -> Result<()> {
        self.require(transform.required_columns())?;
        let outputs = transform.compute(self)?;
        for column in outputs {
            self.set_column(column)?;
        }
        debug!(
            transform = transform.name(),
            interval = %self.interval,
            rows = self.len(),
            "applied transform"
        );
        Ok(())
    }
}

impl AsRef<DataFrame> for BasisSeries {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BasisSeries {
        BasisSeries::from_aligned(
            SamplingInterval::HOURLY,
            vec![0, 1, 2],
            vec![100.0, 101.0, 99.0],
            vec![102.0, 101.5, 99.5],
        )
        .unwrap()
    }

    #[test]
    fn test_price_series_rejects_unsorted() {
        let result = PriceSeries::from_parts(&[2, 1], &[1.0, 1.0]);
        assert!(matches!(result, Err(ContangoError::InvalidData(_))));

        let result = PriceSeries::from_parts(&[1, 1], &[1.0, 1.0]);
        assert!(matches!(result, Err(ContangoError::InvalidData(_))));
    }

    #[test]
    fn test_price_series_length_mismatch() {
        let result = PriceSeries::from_parts(&[1, 2], &[1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_price_series_from_frame() {
        let df = df! {
            "open_time" => &[1_i64, 2, 3],
            "close" => &[10.0, 11.0, 12.0],
        }
        .unwrap();

        let series = PriceSeries::from_frame(&df, "open_time", "close").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.points()[1], PricePoint::new(2, 11.0));

        let missing = PriceSeries::from_frame(&df, "timestamp", "close");
        assert!(matches!(missing, Err(ContangoError::MissingColumn(_))));
    }

    #[test]
    fn test_price_series_from_frame_rejects_null_timestamp() {
        let df = df! {
            "timestamp" => &[Some(1_i64), None, Some(3)],
            "close" => &[Some(10.0), Some(11.0), None],
        }
        .unwrap();

        let err = PriceSeries::from_frame(&df, "timestamp", "close").unwrap_err();
        assert!(matches!(err, ContangoError::InvalidData(_)));
    }

    #[test]
    fn test_price_series_from_frame_null_close_is_nan() {
        let df = df! {
            "timestamp" => &[1_i64, 2],
            "close" => &[Some(10.0), None],
        }
        .unwrap();

        let series = PriceSeries::from_frame(&df, "timestamp", "close").unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.points()[1].close.is_nan());
    }

    #[test]
    fn test_price_point_validity() {
        assert!(PricePoint::new(0, 1.0).is_valid());
        assert!(!PricePoint::new(0, 0.0).is_valid());
        assert!(!PricePoint::new(0, -1.0).is_valid());
        assert!(!PricePoint::new(0, f64::NAN).is_valid());
        assert!(!PricePoint::new(0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_from_aligned_empty_is_alignment_error() {
        let result = BasisSeries::from_aligned(SamplingInterval::DAILY, vec![], vec![], vec![]);
        assert!(matches!(result, Err(ContangoError::Alignment(_))));
    }

    #[test]
    fn test_from_aligned_rejects_bad_price() {
        let result = BasisSeries::from_aligned(
            SamplingInterval::DAILY,
            vec![0, 1],
            vec![100.0, 0.0],
            vec![100.0, 100.0],
        );
        assert!(matches!(result, Err(ContangoError::InvalidData(_))));
    }

    #[test]
    fn test_values_and_columns() {
        let series = sample();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.columns(),
            vec!["timestamp", "spot_price", "futures_price"]
        );
        let spot = series.values(columns::SPOT_PRICE).unwrap();
        assert_eq!(spot, vec![Some(100.0), Some(101.0), Some(99.0)]);
        assert_eq!(series.timestamps().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_values_missing_column() {
        let series = sample();
        let err = series.values(columns::BASIS).unwrap_err();
        assert!(matches!(err, ContangoError::MissingColumn(name) if name == "basis"));
    }

    #[test]
    fn test_set_column_overwrites() {
        let mut series = sample();
        series
            .set_column(float_column("basis", vec![Some(1.0), None, Some(3.0)]))
            .unwrap();
        series
            .set_column(float_column("basis", vec![Some(2.0), Some(2.0), None]))
            .unwrap();

        assert_eq!(series.columns().len(), 4);
        assert_eq!(
            series.values("basis").unwrap(),
            vec![Some(2.0), Some(2.0), None]
        );
    }

    #[test]
    fn test_set_column_rejects_wrong_length_and_fixed_columns() {
        let mut series = sample();
        assert!(series.set_column(float_column("basis", vec![Some(1.0)])).is_err());
        assert!(
            series
                .set_column(float_column(columns::SPOT_PRICE, vec![None, None, None]))
                .is_err()
        );
    }

    #[test]
    fn test_codes_roundtrip() {
        let mut series = sample();
        series.set_column(code_column("signal", vec![-1, 0, 1])).unwrap();
        assert_eq!(
            series.codes("signal").unwrap(),
            vec![Some(-1), Some(0), Some(1)]
        );
    }

    #[test]
    fn test_time_range() {
        let series = sample();
        let (start, end) = series.time_range().unwrap();
        assert_eq!(start.timestamp_millis(), 0);
        assert_eq!(end.timestamp_millis(), 2);
    }
}
