use anyhow::{Context, Result};

use e37_collector::config::Config;
use e37_collector::{E37Client, Liveness};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("{} starting...", e37_collector::name());
    tracing::debug!(
        server = %config.e37_server,
        concurrency = config.concurrency,
        "Configuration loaded"
    );

    let client = E37Client::new(config.options())
        .await
        .context("Failed to connect to E37")?;
    tracing::info!("✅ Authenticated against {}", client.base_url());

    match client
        .check_session()
        .await
        .context("E37 session check failed")?
    {
        Liveness::Valid => tracing::info!("✅ E37 session is valid"),
        Liveness::Refreshed => tracing::warn!("E37 token was rejected and has been refreshed"),
    }

    Ok(())
}
