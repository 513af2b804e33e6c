//! Rolling statistics over optional cells.
//!
//! Every series in the engine is a `[Option<f64>]`: `None` marks a cell that
//! has no value yet (insufficient history, a zero divisor). The functions here
//! never turn `None` into a number. A rolling window containing any undefined
//! cell, or fewer than `window` trailing cells, yields `None`.

use ndarray::Array1;

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Keep a value only if it is finite.
#[inline]
#[must_use]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Collect the defined values of a series.
#[must_use]
pub fn defined(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Period-over-period fractional change, `x(t) / x(t-1) - 1`.
///
/// The first cell is undefined, as is any cell whose current or previous
/// value is undefined or whose previous value is zero.
///
/// # Examples
///
/// ```
/// use contango_traits::stats::pct_change;
///
/// let changes = pct_change(&[Some(100.0), Some(110.0), Some(0.0), Some(5.0)]);
/// assert_eq!(changes[0], None);
/// assert!((changes[1].unwrap() - 0.1).abs() < 1e-12);
/// assert_eq!(changes[3], None);
/// ```
#[must_use]
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let change = match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(cur)) if prev != 0.0 => finite(cur / prev - 1.0),
            _ => None,
        };
        out.push(change);
    }
    out
}

/// First difference, `x(t) - x(t-1)`.
#[must_use]
pub fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let delta = match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(cur)) => finite(cur - prev),
            _ => None,
        };
        out.push(delta);
    }
    out
}

/// Shift a series forward by `periods`, padding the front with `None`.
#[must_use]
pub fn shift<T: Copy>(values: &[Option<T>], periods: usize) -> Vec<Option<T>> {
    let mut out = vec![None; values.len().min(periods)];
    out.extend_from_slice(&values[..values.len().saturating_sub(periods)]);
    out
}

/// Apply `f` to every complete trailing window of `window` cells.
///
/// `f` only sees windows in which every cell is defined.
fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in window..=values.len() {
        buf.clear();
        buf.extend(values[end - window..end].iter().map_while(|v| *v));
        if buf.len() == window {
            out[end - 1] = f(&buf);
        }
    }
    out
}

/// Rolling sum over `window` cells.
#[must_use]
pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| finite(w.iter().sum()))
}

/// Rolling mean over `window` cells.
#[must_use]
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| finite(mean(w)))
}

/// Rolling sample standard deviation (N-1 denominator) over `window` cells.
///
/// A window of one cell has no sample deviation and stays undefined.
#[must_use]
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, sample_std)
}

/// Arithmetic mean of a non-empty slice.
#[inline]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (Bessel's correction), `None` for fewer than
/// two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    finite(variance.sqrt())
}

/// Percentile `q` (0..=100) with linear interpolation between closest ranks.
///
/// Matches the default method of numpy's `percentile`. Returns `None` for an
/// empty input or when any value is non-finite.
///
/// # Examples
///
/// ```
/// use contango_traits::stats::percentile;
///
/// assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), Some(2.5));
/// assert_eq!(percentile(&[], 50.0), None);
/// ```
#[must_use]
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&q) || values.iter().any(|v| !v.is_finite())
    {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Whole-sample moments of the defined cells of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Number of defined cells.
    pub count: usize,
    /// Mean of the defined cells.
    pub mean: Option<f64>,
    /// Sample standard deviation of the defined cells.
    pub std: Option<f64>,
}

/// Mean and sample standard deviation of the defined cells.
#[must_use]
pub fn moments(values: &[Option<f64>]) -> Moments {
    let arr = Array1::from_vec(defined(values));
    let count = arr.len();
    let mean = arr.mean().and_then(finite);
    let std = if count > 1 { finite(arr.std(1.0)) } else { None };
    Moments { count, mean, std }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_pct_change_basic() {
        let out = pct_change(&some(&[2.0, 3.0, 1.5]));
        assert_eq!(out[0], None);
        assert_relative_eq!(out[1].unwrap(), 0.5);
        assert_relative_eq!(out[2].unwrap(), -0.5);
    }

    #[test]
    fn test_pct_change_zero_divisor_is_undefined() {
        let out = pct_change(&some(&[0.0, 1.0, 2.0]));
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 1.0);
    }

    #[test]
    fn test_pct_change_propagates_undefined() {
        let out = pct_change(&[Some(1.0), None, Some(2.0)]);
        assert_eq!(out, vec![None, None, None]);
    }

    #[test]
    fn test_diff() {
        let out = diff(&some(&[1.0, 4.0, 2.0]));
        assert_eq!(out, vec![None, Some(3.0), Some(-2.0)]);
    }

    #[test]
    fn test_shift() {
        let out = shift(&[Some(1), Some(2), Some(3)], 1);
        assert_eq!(out, vec![None, Some(1), Some(2)]);
        let out = shift(&[Some(1), Some(2)], 5);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn test_rolling_sum_needs_full_window() {
        let out = rolling_sum(&some(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(out, vec![None, None, Some(6.0), Some(9.0)]);
    }

    #[test]
    fn test_rolling_window_poisoned_by_undefined() {
        let values = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let out = rolling_sum(&values, 2);
        assert_eq!(out, vec![None, None, None, Some(7.0), Some(9.0)]);
    }

    #[test]
    fn test_rolling_mean() {
        let out = rolling_mean(&some(&[2.0, 4.0, 6.0]), 2);
        assert_eq!(out, vec![None, Some(3.0), Some(5.0)]);
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let out = rolling_std(&some(&[1.0, 2.0, 3.0, 4.0, 5.0]), 5);
        assert!(out[..4].iter().all(Option::is_none));
        assert_relative_eq!(out[4].unwrap(), 2.5_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_window_larger_than_series() {
        let out = rolling_mean(&some(&[1.0, 2.0]), 5);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn test_sample_std_single_value() {
        assert_eq!(sample_std(&[42.0]), None);
    }

    #[test]
    fn test_percentile_linear() {
        let values = [15.0, 20.0, 35.0, 40.0, 50.0];
        assert_relative_eq!(percentile(&values, 0.0).unwrap(), 15.0);
        assert_relative_eq!(percentile(&values, 100.0).unwrap(), 50.0);
        assert_relative_eq!(percentile(&values, 40.0).unwrap(), 29.0);
        assert_relative_eq!(percentile(&values, 33.0).unwrap(), 24.8, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = [3.0, 1.0, 2.0];
        assert_relative_eq!(percentile(&values, 50.0).unwrap(), 2.0);
    }

    #[test]
    fn test_percentile_rejects_bad_input() {
        assert_eq!(percentile(&[1.0, f64::NAN], 50.0), None);
        assert_eq!(percentile(&[1.0, 2.0], 101.0), None);
    }

    #[test]
    fn test_moments_skips_undefined() {
        let m = moments(&[Some(1.0), None, Some(3.0)]);
        assert_eq!(m.count, 2);
        assert_relative_eq!(m.mean.unwrap(), 2.0);
        assert_relative_eq!(m.std.unwrap(), 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_moments_empty() {
        let m = moments(&[None, None]);
        assert_eq!(m.count, 0);
        assert_eq!(m.mean, None);
        assert_eq!(m.std, None);
    }
}
