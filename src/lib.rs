// Core modules
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod strategy;
pub mod universe;

// Re-export commonly used types
pub use api::{AlpacaClient, RetryPolicy, TwelveDataClient};
pub use engine::{Brokerage, Engine, MarketData};
pub use error::BotError;
pub use models::*;
pub use strategy::ThresholdConfig;

// Error handling
pub type Result<T> = std::result::Result<T, BotError>;
