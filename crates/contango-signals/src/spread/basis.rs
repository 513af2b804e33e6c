//! Raw and percent basis.

use contango_traits::types::float_column;
use contango_traits::{BasisSeries, Result, Transform, columns};
use polars::prelude::Column;

/// `futures - spot` per row.
#[must_use]
pub fn basis(spot: &[Option<f64>], futures: &[Option<f64>]) -> Vec<Option<f64>> {
    spot.iter()
        .zip(futures)
        .map(|(s, f)| Some(f.as_ref()? - s.as_ref()?))
        .collect()
}

/// `basis / spot * 100` per row. Undefined where spot is zero.
#[must_use]
pub fn basis_percent(basis: &[Option<f64>], spot: &[Option<f64>]) -> Vec<Option<f64>> {
    basis
        .iter()
        .zip(spot)
        .map(|(b, s)| match (b, s) {
            (Some(b), Some(s)) if *s != 0.0 => Some(b / s * 100.0),
            _ => None,
        })
        .collect()
}

/// Computes `basis` and `basis_percent` from the aligned prices.
///
/// Takes no configuration. Every other stage depends on its output, directly
/// or through `basis_percent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasisSpread;

impl Transform for BasisSpread {
    fn name(&self) -> &str {
        "basis"
    }

    fn required_columns(&self) -> &[&str] {
        &[columns::SPOT_PRICE, columns::FUTURES_PRICE]
    }

    fn output_columns(&self) -> &[&str] {
        &[columns::BASIS, columns::BASIS_PERCENT]
    }

    fn compute(&self, series: &BasisSeries) -> Result<Vec<Column>> {
        let spot = series.values(columns::SPOT_PRICE)?;
        let futures = series.values(columns::FUTURES_PRICE)?;

        let raw = basis(&spot, &futures);
        let percent = basis_percent(&raw, &spot);

        Ok(vec![
            float_column(columns::BASIS, raw),
            float_column(columns::BASIS_PERCENT, percent),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use contango_traits::SamplingInterval;

    fn scenario() -> BasisSeries {
        BasisSeries::from_aligned(
            SamplingInterval::DAILY,
            vec![0, 1, 2, 3],
            vec![100.0, 101.0, 99.0, 102.0],
            vec![102.0, 101.5, 99.5, 103.0],
        )
        .unwrap()
    }

    #[test]
    fn test_four_row_scenario() {
        let mut series = scenario();
        series.apply(&BasisSpread).unwrap();

        let b: Vec<f64> = series.values(columns::BASIS).unwrap().into_iter().flatten().collect();
        assert_eq!(b.len(), 4);
        assert_relative_eq!(b[0], 2.0);
        assert_relative_eq!(b[1], 0.5);
        assert_relative_eq!(b[2], 0.5);
        assert_relative_eq!(b[3], 1.0);

        let pct: Vec<f64> = series
            .values(columns::BASIS_PERCENT)
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_relative_eq!(pct[0], 2.0);
        assert_relative_eq!(pct[1], 0.5 / 101.0 * 100.0);
        assert_relative_eq!(pct[2], 0.5 / 99.0 * 100.0);
        assert_relative_eq!(pct[3], 1.0 / 102.0 * 100.0);
        assert!((pct[1] - 0.495).abs() < 1e-3);
        assert!((pct[2] - 0.505).abs() < 1e-3);
        assert!((pct[3] - 0.980).abs() < 1e-3);
    }

    #[test]
    fn test_basis_identity_holds_for_every_row() {
        let mut series = scenario();
        series.apply(&BasisSpread).unwrap();

        let spot = series.values(columns::SPOT_PRICE).unwrap();
        let futures = series.values(columns::FUTURES_PRICE).unwrap();
        let b = series.values(columns::BASIS).unwrap();
        let pct = series.values(columns::BASIS_PERCENT).unwrap();

        for i in 0..series.len() {
            let (s, f) = (spot[i].unwrap(), futures[i].unwrap());
            assert_eq!(b[i].unwrap(), f - s);
            assert_eq!(pct[i].unwrap(), (f - s) / s * 100.0);
        }
    }

    #[test]
    fn test_undefined_inputs_stay_undefined() {
        let out = basis(&[Some(1.0), None], &[Some(2.0), Some(3.0)]);
        assert_eq!(out, vec![Some(1.0), None]);
        let pct = basis_percent(&[Some(1.0), Some(1.0)], &[Some(0.0), Some(4.0)]);
        assert_eq!(pct, vec![None, Some(25.0)]);
    }
}
