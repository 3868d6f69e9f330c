use crate::error::BotError;
use crate::models::{Position, Quote};
use crate::Result;

/// Threshold dip-buying rule.
///
/// Buy when the price has held up over the year but dipped today:
/// - price is above 60% of the 52-week high (not a collapsed name), and
/// - price is more than 5% below today's open (an intraday dip).
///
/// Sell when a position's unrealized gain exceeds the configured threshold.
#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    /// Price must exceed this fraction of the 52-week high (e.g. 0.60).
    pub high_ratio: f64,

    /// Price must sit below this fraction of today's open (e.g. 0.95).
    pub open_ratio: f64,

    /// Sell when unrealized_plpc strictly exceeds this (e.g. 0.20 = +20%).
    pub sell_threshold: f64,

    /// Dollar amount to deploy per buy. Sizing is dollar-denominated:
    /// we buy `unit_size_usd` worth of shares, not `unit_size_usd` shares.
    pub unit_size_usd: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            high_ratio: 0.60,
            open_ratio: 0.95,
            sell_threshold: 0.20,
            unit_size_usd: 10.0,
        }
    }
}

/// True iff `price / fifty_two_week_high > high_ratio` AND
/// `price / open < open_ratio`, both strict.
///
/// Non-positive denominators are a caller contract violation, not
/// something to coerce silently.
pub fn should_buy(quote: &Quote, price: f64, config: &ThresholdConfig) -> Result<bool> {
    if quote.fifty_two_week_high <= 0.0 {
        return Err(BotError::InvalidQuote {
            symbol: quote.symbol.clone(),
            reason: format!("non-positive 52-week high: {}", quote.fifty_two_week_high),
        });
    }
    if quote.open <= 0.0 {
        return Err(BotError::InvalidQuote {
            symbol: quote.symbol.clone(),
            reason: format!("non-positive open: {}", quote.open),
        });
    }

    Ok(price / quote.fifty_two_week_high > config.high_ratio
        && price / quote.open < config.open_ratio)
}

/// True iff the position's unrealized gain strictly exceeds the threshold.
pub fn should_sell(position: &Position, config: &ThresholdConfig) -> bool {
    position.unrealized_plpc > config.sell_threshold
}

/// Number of shares worth `unit_size_usd` dollars at the given price.
pub fn shares_to_buy(price: f64, unit_size_usd: f64) -> f64 {
    unit_size_usd / price
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote(high: f64, open: f64) -> Quote {
        Quote {
            symbol: "TEST".to_string(),
            fifty_two_week_high: high,
            open,
            fetched_at: Utc::now(),
        }
    }

    fn position(plpc: f64) -> Position {
        Position {
            symbol: "TEST".to_string(),
            qty: 1.0,
            unrealized_plpc: plpc,
        }
    }

    #[test]
    fn test_should_buy_dip_near_high() {
        // 85/100 = 0.85 > 0.60 and 85/95 ≈ 0.894 < 0.95
        let config = ThresholdConfig::default();
        assert!(should_buy(&quote(100.0, 95.0), 85.0, &config).unwrap());
    }

    #[test]
    fn test_should_not_buy_collapsed_name() {
        // 45/100 = 0.45, not above 0.60
        let config = ThresholdConfig::default();
        assert!(!should_buy(&quote(100.0, 50.0), 45.0, &config).unwrap());
    }

    #[test]
    fn test_should_not_buy_without_dip() {
        // 93/95 ≈ 0.979, not below 0.95
        let config = ThresholdConfig::default();
        assert!(!should_buy(&quote(100.0, 95.0), 93.0, &config).unwrap());
    }

    #[test]
    fn test_boundary_ratios_are_strict() {
        let config = ThresholdConfig::default();
        // price/high exactly 0.60: not strictly greater
        assert!(!should_buy(&quote(100.0, 100.0), 60.0, &config).unwrap());
        // price/open exactly 0.95: not strictly less
        assert!(!should_buy(&quote(100.0, 80.0), 76.0, &config).unwrap());
    }

    #[test]
    fn test_zero_high_is_contract_violation() {
        let config = ThresholdConfig::default();
        let err = should_buy(&quote(0.0, 95.0), 85.0, &config).unwrap_err();
        assert!(matches!(err, BotError::InvalidQuote { .. }), "got {:?}", err);
    }

    #[test]
    fn test_zero_open_is_contract_violation() {
        let config = ThresholdConfig::default();
        let err = should_buy(&quote(100.0, 0.0), 85.0, &config).unwrap_err();
        assert!(matches!(err, BotError::InvalidQuote { .. }), "got {:?}", err);
    }

    #[test]
    fn test_should_sell_above_threshold() {
        let config = ThresholdConfig::default();
        assert!(should_sell(&position(0.21), &config));
        assert!(!should_sell(&position(0.19), &config));
        assert!(!should_sell(&position(-0.10), &config));
    }

    #[test]
    fn test_should_sell_equal_to_threshold_is_false() {
        let config = ThresholdConfig::default();
        assert!(!should_sell(&position(0.20), &config));
    }

    #[test]
    fn test_should_sell_respects_configured_threshold() {
        let config = ThresholdConfig {
            sell_threshold: 0.30,
            ..ThresholdConfig::default()
        };
        assert!(!should_sell(&position(0.25), &config));
        assert!(should_sell(&position(0.31), &config));
    }

    #[test]
    fn test_shares_to_buy_is_dollar_denominated() {
        // $10 at $50/share buys 0.2 shares, not 5.
        assert_eq!(shares_to_buy(50.0, 10.0), 0.2);
        assert_eq!(shares_to_buy(10.0, 10.0), 1.0);
        assert_eq!(shares_to_buy(25.0, 100.0), 4.0);
    }
}
