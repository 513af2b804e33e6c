//! CSV loading and result writing for the contango CLI.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use contango::Analysis;
use contango_traits::{ContangoError, PriceSeries};
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, DataType, SerReader, SerWriter};
use std::fs::{self, File};
use std::path::Path;

/// Timestamp column expected in input files.
pub(crate) const TIMESTAMP_COLUMN: &str = "timestamp";

/// Close price column expected in input files.
pub(crate) const CLOSE_COLUMN: &str = "close";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Load a close-price series from a CSV file with a header row.
///
/// Extra columns (open, high, low, volume, ...) are ignored.
pub(crate) fn load_prices(path: &Path) -> Result<PriceSeries, ContangoError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    prices_from_frame(&df)
}

/// Build a price series from a loaded frame.
///
/// Integer timestamps are taken as epoch milliseconds; string timestamps are
/// parsed with [`parse_timestamp`].
pub(crate) fn prices_from_frame(df: &DataFrame) -> Result<PriceSeries, ContangoError> {
    let ts = df
        .column(TIMESTAMP_COLUMN)
        .map_err(|_| ContangoError::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;
    if ts.dtype() != &DataType::String {
        return PriceSeries::from_frame(df, TIMESTAMP_COLUMN, CLOSE_COLUMN);
    }

    let timestamps = ts
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| ContangoError::InvalidData("empty timestamp".to_string()))
                .and_then(parse_timestamp)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let closes: Vec<f64> = df
        .column(CLOSE_COLUMN)
        .map_err(|_| ContangoError::MissingColumn(CLOSE_COLUMN.to_string()))?
        .cast(&DataType::Float64)?
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|c| c.unwrap_or(f64::NAN))
        .collect();

    PriceSeries::from_parts(&timestamps, &closes)
}

/// Parse a timestamp as epoch milliseconds, RFC 3339, a naive UTC datetime
/// or a bare date.
pub(crate) fn parse_timestamp(s: &str) -> Result<i64, ContangoError> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<i64>() {
        return Ok(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| ContangoError::InvalidData(format!("Invalid timestamp: {s}")))
}

/// Write the analysis table and its summary statistics under `dir`.
///
/// File names follow the interval's artifact names, e.g.
/// `advanced_basis_data_1hour.csv` and `advanced_basis_stats_1hour.json`.
pub(crate) fn write_outputs(dir: &Path, analysis: &Analysis) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    let interval = analysis.interval();

    let data_path = dir.join(format!("{}.csv", interval.data_artifact()));
    let mut df = analysis.series.data().clone();
    let mut file = File::create(&data_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    let stats_path = dir.join(format!("{}.json", interval.stats_artifact()));
    let stats = serde_json::to_string_pretty(&analysis.snapshot.summary.rounded(5))?;
    fs::write(&stats_path, stats)?;

    tracing::info!(
        data = %data_path.display(),
        stats = %stats_path.display(),
        "saved analysis"
    );
    Ok(())
}
