//! Transform registry for discovering the available analytics stages.
//!
//! Entries are listed in dependency order: applying them top to bottom on a
//! fresh [`contango_traits::BasisSeries`] always satisfies each stage's
//! required columns.

use contango_traits::columns;
use serde::{Deserialize, Serialize};

/// Stage a transform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Raw and annualized spread between futures and spot
    Spread,
    /// Rolling statistics of the spread
    Indicator,
    /// Whole-history market regime classification
    Regime,
    /// Trading signals and position sizing
    Trading,
    /// Strategy simulation over the signal column
    Evaluation,
}

impl Stage {
    /// Get a human-readable description of the stage.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Spread => "Basis level measures derived row by row from prices",
            Self::Indicator => "Trailing-window statistics of the percent basis",
            Self::Regime => "Static percentile classification of the basis level",
            Self::Trading => "Position direction and size",
            Self::Evaluation => "Backtest of the signal against basis returns",
        }
    }
}

/// Metadata about a transform.
#[derive(Debug, Clone, Serialize)]
pub struct TransformInfo {
    /// Unique identifier, equal to [`contango_traits::Transform::name`]
    pub name: &'static str,

    /// Stage classification
    pub stage: Stage,

    /// Human-readable description
    pub description: &'static str,

    /// Default rolling window, 0 for row-wise transforms
    pub default_window: usize,

    /// Columns written
    pub outputs: &'static [&'static str],
}

/// Get information about all available transforms, in dependency order.
#[must_use]
pub fn available_transforms() -> Vec<TransformInfo> {
    vec![
        TransformInfo {
            name: "basis",
            stage: Stage::Spread,
            description: "Futures minus spot, absolute and as a percent of spot",
            default_window: 0,
            outputs: &[columns::BASIS, columns::BASIS_PERCENT],
        },
        TransformInfo {
            name: "annualized_basis",
            stage: Stage::Spread,
            description: "Percent basis annualized over an assumed 30 days to maturity",
            default_window: 0,
            outputs: &[columns::ANNUALIZED_BASIS],
        },
        TransformInfo {
            name: "basis_zscore",
            stage: Stage::Indicator,
            description: "Rolling z-score of the percent basis",
            default_window: 30,
            outputs: &[columns::BASIS_ZSCORE],
        },
        TransformInfo {
            name: "basis_momentum",
            stage: Stage::Indicator,
            description: "Trailing sum of percent-basis changes",
            default_window: 14,
            outputs: &[columns::BASIS_MOMENTUM],
        },
        TransformInfo {
            name: "vol_adjusted_basis",
            stage: Stage::Indicator,
            description: "Percent basis divided by annualized spot volatility",
            default_window: 30,
            outputs: &[columns::SPOT_VOLATILITY, columns::VOL_ADJUSTED_BASIS],
        },
        TransformInfo {
            name: "market_regime",
            stage: Stage::Regime,
            description: "Backwardation, neutral or contango by 33/67 percentile split",
            default_window: 0,
            outputs: &[columns::MARKET_REGIME],
        },
        TransformInfo {
            name: "signal",
            stage: Stage::Trading,
            description: "Short futures above +2 z, long futures below -2 z",
            default_window: 0,
            outputs: &[columns::SIGNAL],
        },
        TransformInfo {
            name: "position_size",
            stage: Stage::Trading,
            description: "Risk amount divided by approximate ATR of futures",
            default_window: 14,
            outputs: &[columns::POSITION_SIZE],
        },
        TransformInfo {
            name: "backtest",
            stage: Stage::Evaluation,
            description: "Lagged-signal returns on the percent basis net of costs",
            default_window: 0,
            outputs: &[
                columns::STRATEGY_RETURN,
                columns::TRANSACTION_COSTS,
                columns::NET_RETURN,
                columns::CUMULATIVE_RETURN,
                columns::EQUITY,
            ],
        },
    ]
}

/// Get all transforms in a specific stage.
#[must_use]
pub fn transforms_by_stage(stage: &Stage) -> Vec<TransformInfo> {
    available_transforms()
        .into_iter()
        .filter(|info| &info.stage == stage)
        .collect()
}

/// Get information about a specific transform by name.
#[must_use]
pub fn get_transform_info(name: &str) -> Option<TransformInfo> {
    available_transforms()
        .into_iter()
        .find(|info| info.name == name)
}
