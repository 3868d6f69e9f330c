use stockbot::api::{AlpacaClient, TwelveDataClient};
use stockbot::config::Settings;
use stockbot::engine::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Paper-trading env file first, plain environment otherwise.
    if dotenvy::from_filename(".env.paper").is_err() {
        dotenvy::dotenv().ok();
    }

    let settings = Settings::from_env()?;
    setup_logging(&settings.log_level);

    tracing::info!("stockbot starting (paper trading)");
    tracing::info!("  symbol file: {}", settings.constituent_file.display());
    tracing::info!("  sell threshold: {:+.0}%", settings.sell_threshold * 100.0);
    tracing::info!("  unit size: ${:.2}", settings.unit_size_usd);
    tracing::info!("  poll interval: {:?}", settings.poll_interval);

    let market = TwelveDataClient::new(settings.td_api_key.clone());
    let broker = AlpacaClient::new(
        settings.alpaca_api_key.clone(),
        settings.alpaca_secret_key.clone(),
    );

    let engine = Engine::new(
        market,
        broker,
        settings.thresholds(),
        settings.constituent_file.clone(),
        settings.poll_interval,
    );

    engine.run().await?;

    tracing::info!("stockbot stopped");
    Ok(())
}

fn setup_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(format!("stockbot={}", level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stockbot=info")),
        )
        .init();
}
