//! # Onramp Gateway
//!
//! Main entry point for the gateway service.

use anyhow::Context;
use onramp_gateway::api::{AppState, create_router};
use onramp_gateway::config::{AppConfig, LogConfig, LogFormat};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const OTP_PURGE_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(log.include_target);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    init_tracing(&config.log);

    info!(
        service = %config.service_name,
        environment = %config.environment,
        "starting onramp gateway v{}",
        env!("CARGO_PKG_VERSION")
    );
    config.require_secrets()?;

    let state = Arc::new(AppState::from_config(&config)?);

    let purge_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(OTP_PURGE_INTERVAL);
        loop {
            tokio::select! {
                () = purge_state.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = purge_state.purge_expired_codes().await;
                    if purged > 0 {
                        debug!(purged, "expired login codes purged");
                    }
                }
            }
        }
    });

    let addr = config.rest.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    let shutdown = state.shutdown.clone();
    axum::serve(listener, create_router(state, &config.rest))
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                debug!("ctrl-c handler unavailable, waiting for cancellation");
                shutdown.cancelled().await;
                return;
            }
            info!("shutting down onramp gateway");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
