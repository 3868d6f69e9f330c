pub mod alpaca;
pub mod retry;
pub mod twelvedata;

pub use alpaca::AlpacaClient;
pub use retry::RetryPolicy;
pub use twelvedata::TwelveDataClient;
