//! Domain checks for configuration values.
//!
//! Every check fails with [`ContangoError::InvalidParameter`]; nothing is
//! clamped into range.

use crate::{ContangoError, Result};

/// Requires `window >= min`.
///
/// # Errors
///
/// Fails when the window is too short.
pub fn ensure_window(name: &'static str, window: usize, min: usize) -> Result<()> {
    if window < min {
        return Err(ContangoError::invalid_parameter(
            name,
            format!("must be at least {min}, got {window}"),
        ));
    }
    Ok(())
}

/// Requires a finite value strictly greater than zero.
///
/// # Errors
///
/// Fails for zero, negative or non-finite values.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ContangoError::invalid_parameter(
            name,
            format!("must be positive and finite, got {value}"),
        ));
    }
    Ok(())
}

/// Requires a fraction in `(0, 1]`.
///
/// # Errors
///
/// Fails outside the half-open unit interval.
pub fn ensure_fraction(name: &'static str, value: f64) -> Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ContangoError::invalid_parameter(
            name,
            format!("must be in (0, 1], got {value}"),
        ));
    }
    Ok(())
}

/// Requires a cost rate in `[0, 1)`.
///
/// # Errors
///
/// Fails for negative, non-finite or >= 1 rates.
pub fn ensure_rate(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..1.0).contains(&value) {
        return Err(ContangoError::invalid_parameter(
            name,
            format!("must be in [0, 1), got {value}"),
        ));
    }
    Ok(())
}
