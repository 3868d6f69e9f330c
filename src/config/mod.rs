use crate::error::BotError;
use crate::strategy::ThresholdConfig;
use crate::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Process configuration, sourced from the environment.
///
/// Required credentials missing at startup are fatal; the tunables fall
/// back to the documented defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub td_api_key: String,
    pub alpaca_api_key: String,
    pub alpaca_secret_key: String,
    pub constituent_file: PathBuf,
    pub log_level: String,
    pub sell_threshold: f64,
    pub unit_size_usd: f64,
    pub poll_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any name→value lookup. Tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| BotError::Configuration(format!("{} is not set", name)))
        };

        let parse_f64 = |name: &str, default: f64| -> Result<f64> {
            match lookup(name) {
                None => Ok(default),
                Some(raw) => raw.parse().map_err(|_| {
                    BotError::Configuration(format!("{} is not a number: {:?}", name, raw))
                }),
            }
        };

        let poll_interval_secs = match lookup("POLL_INTERVAL_SECS") {
            None => 300,
            Some(raw) => raw.parse().map_err(|_| {
                BotError::Configuration(format!("POLL_INTERVAL_SECS is not a number: {:?}", raw))
            })?,
        };

        Ok(Self {
            td_api_key: required("TD_API_KEY")?,
            alpaca_api_key: required("ALPACA_API_KEY")?,
            alpaca_secret_key: required("ALPACA_SECRET_KEY")?,
            constituent_file: PathBuf::from(required("CONSTITUENT_FILE")?),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            sell_threshold: parse_f64("SELL_THRESHOLD", 0.20)?,
            unit_size_usd: parse_f64("UNIT_SIZE_USD", 10.0)?,
            poll_interval: Duration::from_secs(poll_interval_secs),
        })
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            sell_threshold: self.sell_threshold,
            unit_size_usd: self.unit_size_usd,
            ..ThresholdConfig::default()
        }
    }
}
