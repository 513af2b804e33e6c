//! Rolling statistical indicators of the basis.
//!
//! - [`BasisZScore`]: distance of `basis_percent` from its trailing mean
//! - [`BasisMomentum`]: trailing sum of `basis_percent` changes
//! - [`VolatilityAdjustedBasis`]: `basis_percent` per unit of spot volatility
//!
//! All three read only `basis_percent` and prices, so they are mutually
//! independent and may run in any order after the spread stage.

mod momentum;
mod volatility;
mod zscore;

pub use momentum::{BasisMomentum, MomentumConfig, basis_momentum};
pub use volatility::{
    VolatilityAdjustedBasis, VolatilityConfig, spot_volatility, vol_adjusted_basis,
};
pub use zscore::{BasisZScore, ZScoreConfig, basis_zscore};
