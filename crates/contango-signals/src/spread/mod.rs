//! Spread transforms comparing futures to spot.
//!
//! - [`BasisSpread`]: `basis` and `basis_percent`, computed first
//! - [`AnnualizedBasis`]: basis annualized over an assumed time to maturity

mod annualized;
mod basis;

pub use annualized::{AnnualizedBasis, AnnualizedBasisConfig, annualized_basis};
pub use basis::{BasisSpread, basis, basis_percent};
