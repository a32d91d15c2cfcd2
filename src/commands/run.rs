//! Relay command: log in, then publish on the configured interval until Ctrl-C.

use anyhow::{Context, Result};
use std::path::Path;

use crate::chat::discord::{DiscordClient, GatewaySession};
use crate::core::config::Config;
use crate::core::publisher::Publisher;
use crate::core::sampler::{MetricSampler, SamplerConfig};

pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let path = Config::resolve_path(config_path)?;
    let config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("sysrelay-worker")
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(relay(config))
}

async fn relay(config: Config) -> Result<()> {
    let client = DiscordClient::new(&config.token)?;

    // Subscribed once: the schedule starts only after the first READY
    let session = GatewaySession::connect(&config.token)
        .await
        .context("Failed to log in to the Discord gateway")?;
    log::info!("Logged in as {}", session.user_tag());

    let sampler = MetricSampler::new(SamplerConfig::from_config(&config));
    let publisher = Publisher::new(client, sampler, config.channel_id.clone(), config.interval());

    log::info!(
        "Publishing to channel {} every {}s",
        config.channel_id,
        config.interval
    );

    tokio::select! {
        _ = publisher.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            log::info!("Shutting down");
        }
    }

    if !session.is_alive() {
        log::warn!("Gateway session had already ended");
    }
    session.close();

    Ok(())
}
