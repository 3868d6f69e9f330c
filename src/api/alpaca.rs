use crate::error::BotError;
use crate::models::{OrderAck, OrderSide, Position, TimeInForce};
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ALPACA_PAPER_API_BASE: &str = "https://paper-api.alpaca.markets";

/// Client for the Alpaca trading API, paper mode.
///
/// Order submission is deliberately retry-free: a market order is not
/// idempotent-safe to resubmit, so rejections surface to the caller.
#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

// ============== Request/Response Types ==============

#[derive(Debug, Serialize)]
struct MarketOrderRequest<'a> {
    symbol: &'a str,
    qty: String,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: TimeInForce,
}

#[derive(Debug, Deserialize)]
struct PositionRaw {
    symbol: String,
    qty: String,
    unrealized_plpc: String,
}

#[derive(Debug, Deserialize)]
struct ClockRaw {
    is_open: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorRaw {
    message: String,
}

// ============== Implementation ==============

impl AlpacaClient {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_secret,
            base_url: ALPACA_PAPER_API_BASE.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
    }

    /// Submit a DAY market order.
    /// Endpoint: POST /v2/orders
    pub async fn submit_market_order(
        &self,
        symbol: &str,
        qty: f64,
        side: OrderSide,
    ) -> Result<OrderAck> {
        let request = MarketOrderRequest {
            symbol,
            qty: format!("{}", qty),
            side,
            order_type: "market",
            time_in_force: TimeInForce::Day,
        };

        let response = self
            .client
            .post(format!("{}/v2/orders", self.base_url))
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            // Insufficient buying power, unknown symbol, market closed...
            let reason = match response.json::<ApiErrorRaw>().await {
                Ok(body) => body.message,
                Err(_) => format!("HTTP {}", status),
            };
            return Err(BotError::OrderRejected {
                symbol: symbol.to_string(),
                reason,
            });
        }

        let ack: OrderAck = response.error_for_status()?.json().await?;
        tracing::debug!(
            "order {} for {} acknowledged with status {}",
            ack.id,
            ack.symbol,
            ack.status
        );
        Ok(ack)
    }

    /// List all open positions, freshly read from the brokerage.
    /// Endpoint: GET /v2/positions
    pub async fn list_positions(&self) -> Result<Vec<Position>> {
        let raw: Vec<PositionRaw> = self
            .get("/v2/positions")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut positions = Vec::with_capacity(raw.len());
        for p in raw {
            positions.push(Position {
                qty: p.qty.parse().map_err(|_| BotError::InvalidQuote {
                    symbol: p.symbol.clone(),
                    reason: format!("position qty is not a number: {:?}", p.qty),
                })?,
                unrealized_plpc: p.unrealized_plpc.parse().map_err(|_| {
                    BotError::InvalidQuote {
                        symbol: p.symbol.clone(),
                        reason: format!(
                            "position unrealized_plpc is not a number: {:?}",
                            p.unrealized_plpc
                        ),
                    }
                })?,
                symbol: p.symbol,
            });
        }
        Ok(positions)
    }

    /// Whether the market is currently open.
    /// Endpoint: GET /v2/clock
    pub async fn market_is_open(&self) -> Result<bool> {
        let clock: ClockRaw = self
            .get("/v2/clock")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(clock.is_open)
    }
}
