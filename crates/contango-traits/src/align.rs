//! Alignment of a spot and a futures price series.
//!
//! Two policies are supported:
//!
//! - [`AlignmentPolicy::InnerJoin`] keeps only timestamps present in both series.
//! - [`AlignmentPolicy::InterpolatedUnion`] takes the union of timestamps and
//!   fills each series' gaps by linear interpolation in time. Rows before a
//!   series' first or after its last observation are dropped, so no value is
//!   invented outside the observed range.
//!
//! Before aligning, rows whose close is not finite and strictly positive are
//! dropped and counted in the returned [`CleaningReport`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{PricePoint, PriceSeries, TimestampMs};
use crate::{ContangoError, Result};

/// How two price series are matched up row by row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Keep timestamps present in both inputs.
    #[default]
    InnerJoin,
    /// Union of timestamps with time-linear interpolation inside each input.
    InterpolatedUnion,
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InnerJoin => f.write_str("inner_join"),
            Self::InterpolatedUnion => f.write_str("interpolated_union"),
        }
    }
}

impl FromStr for AlignmentPolicy {
    type Err = ContangoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "inner" | "inner_join" | "inner-join" => Ok(Self::InnerJoin),
            "interpolated" | "interpolated_union" | "interpolated-union" => {
                Ok(Self::InterpolatedUnion)
            }
            other => Err(ContangoError::invalid_parameter(
                "alignment_policy",
                format!("unknown policy `{other}`, expected inner or interpolated"),
            )),
        }
    }
}

/// Row accounting for one alignment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Policy that produced the rows.
    pub policy: AlignmentPolicy,
    /// Spot rows dropped for a non-finite or non-positive close.
    pub spot_dropped: usize,
    /// Futures rows dropped for a non-finite or non-positive close.
    pub futures_dropped: usize,
    /// Rows in the aligned output.
    pub rows: usize,
}

/// Parallel vectors of aligned rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPrices {
    /// Row timestamps, strictly increasing.
    pub timestamps: Vec<TimestampMs>,
    /// Spot close per row.
    pub spot: Vec<f64>,
    /// Futures close per row.
    pub futures: Vec<f64>,
}

impl AlignedPrices {
    fn with_capacity(n: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(n),
            spot: Vec::with_capacity(n),
            futures: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, timestamp: TimestampMs, spot: f64, futures: f64) {
        self.timestamps.push(timestamp);
        self.spot.push(spot);
        self.futures.push(futures);
    }

    /// Number of aligned rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether nothing survived alignment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Drops rows whose close is not finite and strictly positive.
///
/// Returns the surviving points and the number dropped.
#[must_use]
pub fn clean(series: &PriceSeries) -> (Vec<PricePoint>, usize) {
    let kept: Vec<PricePoint> = series
        .points()
        .iter()
        .copied()
        .filter(PricePoint::is_valid)
        .collect();
    let dropped = series.len() - kept.len();
    (kept, dropped)
}

/// Aligns spot and futures under `policy`.
///
/// # Errors
///
/// Returns [`ContangoError::Alignment`] if no row survives.
pub fn align(
    spot: &PriceSeries,
    futures: &PriceSeries,
    policy: AlignmentPolicy,
) -> Result<(AlignedPrices, CleaningReport)> {
    let (spot_points, spot_dropped) = clean(spot);
    let (futures_points, futures_dropped) = clean(futures);

    if spot_dropped > 0 || futures_dropped > 0 {
        warn!(
            spot_dropped,
            futures_dropped, "dropped rows with non-finite or non-positive prices"
        );
    }

    let aligned = match policy {
        AlignmentPolicy::InnerJoin => inner_join(&spot_points, &futures_points),
        AlignmentPolicy::InterpolatedUnion => interpolated_union(&spot_points, &futures_points),
    };

    if aligned.is_empty() {
        return Err(ContangoError::Alignment(format!(
            "no overlapping rows under {policy} ({} spot, {} futures usable)",
            spot_points.len(),
            futures_points.len()
        )));
    }

    let report = CleaningReport {
        policy,
        spot_dropped,
        futures_dropped,
        rows: aligned.len(),
    };
    Ok((aligned, report))
}

fn inner_join(spot: &[PricePoint], futures: &[PricePoint]) -> AlignedPrices {
    let mut out = AlignedPrices::with_capacity(spot.len().min(futures.len()));
    let (mut i, mut j) = (0, 0);
    while i < spot.len() && j < futures.len() {
        let (s, f) = (spot[i], futures[j]);
        match s.timestamp.cmp(&f.timestamp) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(s.timestamp, s.close, f.close);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn interpolated_union(spot: &[PricePoint], futures: &[PricePoint]) -> AlignedPrices {
    let mut union: Vec<TimestampMs> = spot
        .iter()
        .chain(futures.iter())
        .map(|p| p.timestamp)
        .collect();
    union.sort_unstable();
    union.dedup();

    let spot_values = interpolate_at(spot, &union);
    let futures_values = interpolate_at(futures, &union);

    let mut out = AlignedPrices::with_capacity(union.len());
    for ((t, s), f) in union.iter().zip(spot_values).zip(futures_values) {
        if let (Some(s), Some(f)) = (s, f) {
            out.push(*t, s, f);
        }
    }
    out
}

/// Samples `points` at each of the sorted `targets`, interpolating linearly in
/// time between neighbours. Targets outside the observed range are `None`.
fn interpolate_at(points: &[PricePoint], targets: &[TimestampMs]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(targets.len());
    // index of the first point with timestamp >= target
    let mut next = 0;
    for &t in targets {
        while next < points.len() && points[next].timestamp < t {
            next += 1;
        }
        let value = match points.get(next) {
            Some(p) if p.timestamp == t => Some(p.close),
            Some(after) if next > 0 => {
                let before = points[next - 1];
                let span = (after.timestamp - before.timestamp) as f64;
                let frac = (t - before.timestamp) as f64 / span;
                Some(before.close + (after.close - before.close) * frac)
            }
            _ => None,
        };
        out.push(value);
    }
    out
}
