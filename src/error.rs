use thiserror::Error;

/// Everything that can go wrong in a trading cycle.
///
/// The split between `TransientFetch` and `ProviderService` matters for the
/// data gateway: connectivity failures get the bounded exponential backoff,
/// provider-side errors (rate limiting etc.) get the fixed cooldown.
#[derive(Debug, Error)]
pub enum BotError {
    /// Missing/unreadable configuration (env vars, symbol file path).
    /// Fatal at startup, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Symbol file does not have the expected shape.
    #[error("symbol file parse error: {0}")]
    Parse(String),

    /// Connectivity failure that survived every backoff attempt.
    #[error("fetch for {symbol} failed after {attempts} attempts: {last_error}")]
    TransientFetch {
        symbol: String,
        attempts: u32,
        last_error: String,
    },

    /// Structured error from the data provider (e.g. rate limit) that
    /// survived every cooldown attempt.
    #[error("provider error for {symbol} (code {code}): {message}")]
    ProviderService {
        symbol: String,
        code: u32,
        message: String,
    },

    /// Malformed or out-of-contract quote/price payload. Retrying cannot
    /// fix bad data, so this propagates immediately.
    #[error("invalid quote for {symbol}: {reason}")]
    InvalidQuote { symbol: String, reason: String },

    /// The brokerage declined an order. Not retried: order submission is
    /// not idempotent-safe.
    #[error("order rejected for {symbol}: {reason}")]
    OrderRejected { symbol: String, reason: String },

    /// Raw HTTP failure, before the gateway classifies it.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
