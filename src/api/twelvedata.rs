use crate::api::retry::RetryPolicy;
use crate::error::BotError;
use crate::models::{Price, Quote};
use crate::Result;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;

const TWELVEDATA_API_BASE: &str = "https://api.twelvedata.com";

/// Client for the TwelveData market-data API.
///
/// Owns the retry behavior for both failure modes: bounded exponential
/// backoff for connectivity failures, bounded fixed cooldown for
/// provider-side errors (the free tier rate-limits at 8 requests/minute).
#[derive(Clone)]
pub struct TwelveDataClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct PriceRaw {
    price: String,
}

#[derive(Debug, Deserialize)]
struct QuoteRaw {
    open: String,
    fifty_two_week: FiftyTwoWeekRaw,
}

#[derive(Debug, Deserialize)]
struct FiftyTwoWeekRaw {
    high: String,
}

/// One failed attempt, classified. Decides which retry policy applies.
enum FetchFailure {
    Transient(String),
    Provider { code: u32, message: String },
}

// ============== Implementation ==============

impl TwelveDataClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: TWELVEDATA_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the current trade price for a symbol.
    /// Endpoint: GET /price?symbol={symbol}&apikey={key}
    pub async fn get_price(&self, symbol: &str) -> Result<Price> {
        let url = format!(
            "{}/price?symbol={}&apikey={}",
            self.base_url, symbol, self.api_key
        );
        let body = self.request_with_retry(&url, symbol).await?;

        let raw: PriceRaw = serde_json::from_value(body).map_err(|e| BotError::InvalidQuote {
            symbol: symbol.to_string(),
            reason: format!("unexpected price payload: {}", e),
        })?;
        let value = parse_positive(&raw.price, "price", symbol)?;

        Ok(Price {
            symbol: symbol.to_string(),
            value,
            fetched_at: Utc::now(),
        })
    }

    /// Get a quote snapshot (today's open, 52-week high) for a symbol.
    /// Endpoint: GET /quote?symbol={symbol}&apikey={key}
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        tracing::debug!("getting quote for {}", symbol);
        let url = format!(
            "{}/quote?symbol={}&apikey={}",
            self.base_url, symbol, self.api_key
        );
        let body = self.request_with_retry(&url, symbol).await?;

        let raw: QuoteRaw = serde_json::from_value(body).map_err(|e| BotError::InvalidQuote {
            symbol: symbol.to_string(),
            reason: format!("unexpected quote payload: {}", e),
        })?;

        Ok(Quote {
            symbol: symbol.to_string(),
            fifty_two_week_high: parse_positive(&raw.fifty_two_week.high, "52-week high", symbol)?,
            open: parse_positive(&raw.open, "open", symbol)?,
            fetched_at: Utc::now(),
        })
    }

    /// Drive a GET request through both retry policies until it succeeds
    /// or a policy budget is exhausted.
    async fn request_with_retry(&self, url: &str, symbol: &str) -> Result<serde_json::Value> {
        let mut transient_failures = 0u32;
        let mut provider_failures = 0u32;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(FetchFailure::Transient(reason)) => {
                    transient_failures += 1;
                    if transient_failures >= self.retry.max_attempts {
                        return Err(BotError::TransientFetch {
                            symbol: symbol.to_string(),
                            attempts: transient_failures,
                            last_error: reason,
                        });
                    }
                    let delay = self.retry.backoff_delay(transient_failures);
                    tracing::warn!(
                        "attempt {}/{} for {} failed: {}. Retrying in {:?}...",
                        transient_failures,
                        self.retry.max_attempts,
                        symbol,
                        reason,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(FetchFailure::Provider { code, message }) => {
                    provider_failures += 1;
                    if provider_failures >= self.retry.max_provider_attempts {
                        return Err(BotError::ProviderService {
                            symbol: symbol.to_string(),
                            code,
                            message,
                        });
                    }
                    tracing::warn!(
                        "provider error for {} (code {}): {}. Cooling down {:?}...",
                        symbol,
                        code,
                        message,
                        self.retry.provider_cooldown
                    );
                    sleep(self.retry.provider_cooldown).await;
                }
            }
        }
    }

    /// One request, one classification. No retries at this level.
    async fn fetch_once(&self, url: &str) -> std::result::Result<serde_json::Value, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(FetchFailure::Transient(format!(
                "TwelveData HTTP error: {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchFailure::Transient(e.to_string()))?;

        // Provider errors come back as 200 with a structured error body.
        if body.get("status").and_then(|s| s.as_str()) == Some("error") {
            let code = body.get("code").and_then(|c| c.as_u64()).unwrap_or(0) as u32;
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown provider error")
                .to_string();
            return Err(FetchFailure::Provider { code, message });
        }

        Ok(body)
    }
}

fn parse_positive(field: &str, name: &str, symbol: &str) -> Result<f64> {
    let value: f64 = field.parse().map_err(|_| BotError::InvalidQuote {
        symbol: symbol.to_string(),
        reason: format!("{} is not a number: {:?}", name, field),
    })?;
    if value <= 0.0 {
        return Err(BotError::InvalidQuote {
            symbol: symbol.to_string(),
            reason: format!("{} must be positive, got {}", name, value),
        });
    }
    Ok(value)
}
