use crate::api::{AlpacaClient, TwelveDataClient};
use crate::error::BotError;
use crate::models::{OrderAck, OrderSide, Position, Price, Quote};
use crate::strategy::{shares_to_buy, should_buy, should_sell, ThresholdConfig};
use crate::universe;
use crate::Result;
use std::path::PathBuf;
use tokio::time::{sleep, Duration};

/// Quote/price source seam. The production impl is `TwelveDataClient`;
/// tests substitute fakes.
pub trait MarketData {
    async fn get_quote(&self, symbol: &str) -> Result<Quote>;
    async fn get_price(&self, symbol: &str) -> Result<Price>;
}

/// Brokerage seam. The production impl is `AlpacaClient`.
pub trait Brokerage {
    async fn submit_market_order(
        &self,
        symbol: &str,
        qty: f64,
        side: OrderSide,
    ) -> Result<OrderAck>;
    async fn list_positions(&self) -> Result<Vec<Position>>;
    async fn market_is_open(&self) -> Result<bool>;
}

impl MarketData for TwelveDataClient {
    async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        TwelveDataClient::get_quote(self, symbol).await
    }

    async fn get_price(&self, symbol: &str) -> Result<Price> {
        TwelveDataClient::get_price(self, symbol).await
    }
}

impl Brokerage for AlpacaClient {
    async fn submit_market_order(
        &self,
        symbol: &str,
        qty: f64,
        side: OrderSide,
    ) -> Result<OrderAck> {
        AlpacaClient::submit_market_order(self, symbol, qty, side).await
    }

    async fn list_positions(&self) -> Result<Vec<Position>> {
        AlpacaClient::list_positions(self).await
    }

    async fn market_is_open(&self) -> Result<bool> {
        AlpacaClient::market_is_open(self).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Stopped,
}

/// What one cycle did. Returned for logging and tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    pub evaluated: usize,
    pub buys: usize,
    pub sells: usize,
    pub skipped: usize,
}

/// The polling loop: evaluate every symbol, scan positions for exits,
/// stop when the market closes.
pub struct Engine<M, B> {
    market: M,
    broker: B,
    thresholds: ThresholdConfig,
    symbol_file: PathBuf,
    poll_interval: Duration,
}

/// Partition symbols into five contiguous slices: floor(n/5) each for the
/// first four, the remainder in the fifth. Covers every symbol exactly
/// once, in order. Vestigial batching from an earlier design; kept as the
/// unit of progress logging, evaluation is sequential either way.
pub fn partition_symbols<T>(symbols: &[T]) -> Vec<&[T]> {
    let group = symbols.len() / 5;
    let mut slices = Vec::with_capacity(5);
    for i in 0..4 {
        slices.push(&symbols[i * group..(i + 1) * group]);
    }
    slices.push(&symbols[4 * group..]);
    slices
}

impl<M: MarketData, B: Brokerage> Engine<M, B> {
    pub fn new(
        market: M,
        broker: B,
        thresholds: ThresholdConfig,
        symbol_file: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            market,
            broker,
            thresholds,
            symbol_file,
            poll_interval,
        }
    }

    /// Run cycles until the market-open check reports closed.
    pub async fn run(&self) -> Result<()> {
        let mut state = EngineState::Running;
        while state == EngineState::Running {
            let report = self.run_cycle().await?;
            tracing::info!(
                "cycle complete: {} evaluated, {} buys, {} sells, {} skipped",
                report.evaluated,
                report.buys,
                report.sells,
                report.skipped
            );

            match self.broker.market_is_open().await {
                Ok(true) => {
                    tracing::debug!("market open, next cycle in {:?}", self.poll_interval);
                    sleep(self.poll_interval).await;
                }
                Ok(false) => {
                    tracing::info!("market closed, stopping");
                    state = EngineState::Stopped;
                }
                Err(e) => {
                    // Unreachable clock is not proof the market closed;
                    // stay RUNNING and re-check next cycle.
                    tracing::error!("market clock check failed: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
        Ok(())
    }

    /// One full pass: evaluate every symbol for entry, then scan positions
    /// for exits. Per-symbol failures are logged and skipped; only symbol
    /// file problems abort the cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let symbols = universe::load_symbols(&self.symbol_file)?;
        let mut report = CycleReport::default();

        for (batch_idx, batch) in partition_symbols(&symbols).iter().enumerate() {
            tracing::debug!("batch {}/5: {} symbols", batch_idx + 1, batch.len());
            for symbol in batch.iter() {
                report.evaluated += 1;
                match self.evaluate_symbol(symbol).await {
                    Ok(true) => report.buys += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!("skipping {}: {}", symbol, e);
                        report.skipped += 1;
                    }
                }
            }
        }

        // A brokerage hiccup costs us one sell scan, not the process;
        // positions are re-read fresh next cycle anyway.
        match self.scan_for_exits().await {
            Ok(sells) => report.sells = sells,
            Err(e) => tracing::error!("skipping sell scan this cycle: {}", e),
        }
        Ok(report)
    }

    /// Evaluate one symbol; returns whether a buy was submitted.
    async fn evaluate_symbol(&self, symbol: &str) -> Result<bool> {
        tracing::debug!("running algorithm for {}", symbol);

        let quote = self.market.get_quote(symbol).await?;
        let price = self.market.get_price(symbol).await?;

        if !should_buy(&quote, price.value, &self.thresholds)? {
            return Ok(false);
        }

        let qty = shares_to_buy(price.value, self.thresholds.unit_size_usd);
        tracing::info!("buying {} shares of {} at ~{}", qty, symbol, price.value);
        let ack = self
            .broker
            .submit_market_order(symbol, qty, OrderSide::Buy)
            .await?;
        tracing::info!("buy order {} for {}: {}", ack.id, symbol, ack.status);
        Ok(true)
    }

    /// Sell every position whose unrealized gain exceeds the threshold.
    /// Rejections are logged and the scan continues.
    async fn scan_for_exits(&self) -> Result<usize> {
        let positions = self.broker.list_positions().await?;
        let mut sells = 0;

        for position in positions {
            if !should_sell(&position, &self.thresholds) {
                continue;
            }
            tracing::info!(
                "selling {} shares of {} (unrealized {:+.1}%)",
                position.qty,
                position.symbol,
                position.unrealized_plpc * 100.0
            );
            match self
                .broker
                .submit_market_order(&position.symbol, position.qty, OrderSide::Sell)
                .await
            {
                Ok(ack) => {
                    tracing::info!("sell order {} for {}: {}", ack.id, position.symbol, ack.status);
                    sells += 1;
                }
                Err(BotError::OrderRejected { symbol, reason }) => {
                    tracing::error!("sell for {} rejected: {}", symbol, reason);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(sells)
    }
}
