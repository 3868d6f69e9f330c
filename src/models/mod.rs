use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quote snapshot for a symbol at fetch time.
///
/// Re-fetched every cycle, never persisted. The gateway parses both
/// reference prices out of the wire payload and rejects non-positive or
/// unparseable values before they get here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub fifty_two_week_high: f64,
    pub open: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Current trade price for a symbol at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub symbol: String,
    pub value: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Brokerage-reported holding. Owned and mutated exclusively by the
/// brokerage; we only ever read it, fresh, each cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub qty: f64,
    /// Fractional unrealized gain/loss relative to cost basis.
    pub unrealized_plpc: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// Only DAY orders are submitted; the order dies with the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

/// Brokerage acknowledgement for a submitted order. Logged and forgotten;
/// there is no local order ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderAck {
    pub id: String,
    pub symbol: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_side_wire_names() {
        assert_eq!(OrderSide::Buy.as_str(), "buy");
        assert_eq!(OrderSide::Sell.as_str(), "sell");
    }

    #[test]
    fn test_position_allows_negative_plpc() {
        let position = Position {
            symbol: "AAPL".to_string(),
            qty: 3.0,
            unrealized_plpc: -0.12,
        };
        assert!(position.unrealized_plpc < 0.0);
    }
}
