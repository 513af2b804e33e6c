//! Transform trait for basis analytics stages.
//!
//! This module defines the `Transform` trait, the seam every analytics stage
//! implements. A transform reads existing columns of a [`BasisSeries`] and
//! returns new columns; it never mutates the series itself. Merging is done
//! by [`BasisSeries::apply`], which makes every stage independently testable
//! and re-runnable.

use polars::prelude::Column;
use tracing::warn;

use crate::{BasisSeries, Result};

/// A pure stage of the basis analytics pipeline.
///
/// Implementations should be thread-safe (`Send + Sync`) so independent
/// series (one per sampling interval) can be analysed in parallel.
///
/// # Example
///
/// ```no_run
/// use contango_traits::{BasisSeries, Result, Transform, columns};
/// use contango_traits::types::float_column;
/// use polars::prelude::Column;
///
/// struct SpotSquared;
///
/// impl Transform for SpotSquared {
///     fn name(&self) -> &str {
///         "spot_squared"
///     }
///
///     fn required_columns(&self) -> &[&str] {
///         &[columns::SPOT_PRICE]
///     }
///
///     fn output_columns(&self) -> &[&str] {
///         &["spot_squared"]
///     }
///
///     fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
///         let spot = series.values(columns::SPOT_PRICE)?;
///         let squared = spot.iter().map(|v| v.map(|x| x * x)).collect();
///         Ok(vec![float_column("spot_squared", squared)])
///     }
/// }
/// ```
pub trait Transform: Send + Sync {
    /// Returns the name of this transform, used in logs and the registry.
    fn name(&self) -> &str;

    /// Columns that must exist before [`Transform::compute`] is called.
    fn required_columns(&self) -> &[&str];

    /// Columns this transform writes.
    fn output_columns(&self) -> &[&str];

    /// Computes the output columns from a snapshot of the series.
    ///
    /// Every returned column has one cell per row of `series`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A configuration value is outside its domain
    /// - A required column is missing
    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>>;
}

/// Whether `rows` can fill a rolling window of `window` rows at least once.
#[must_use]
pub const fn has_sufficient_history(rows: usize, window: usize) -> bool {
    rows >= window
}

/// Warns when a rolling statistic of `transform` cannot fill its window.
///
/// Short history is not an error: the affected column is simply undefined
/// everywhere. Returns [`has_sufficient_history`].
pub fn check_history(transform: &str, rows: usize, window: usize) -> bool {
    let sufficient = has_sufficient_history(rows, window);
    if !sufficient {
        warn!(
            transform,
            rows,
            window,
            "insufficient history, column will be undefined"
        );
    }
    sufficient
}
