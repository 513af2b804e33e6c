//! Trading stages: z-score threshold signals and ATR-normalized sizing.

mod signal;
mod sizing;

pub use signal::{SignalConfig, SignalGenerator, TradeSignal, generate_signal};
pub use sizing::{PositionSizer, PositionSizingConfig, average_true_range, position_size};
