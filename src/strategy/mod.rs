// Decision rules: pure functions, no I/O.
pub mod threshold;

pub use threshold::{shares_to_buy, should_buy, should_sell, ThresholdConfig};
