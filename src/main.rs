use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use keyword_relay::channels::{SlackClient, event_routes};
use keyword_relay::config::RelayConfig;
use keyword_relay::pipeline::{ChannelRouter, EventProcessor};
use keyword_relay::store::{KeywordStore, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().context("invalid configuration")?;

    eprintln!("Keyword Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Control: {}", config.channels.control);
    eprintln!("   Source:  {}", config.channels.source);
    eprintln!("   Target:  {}", config.channels.target);

    // ── Keyword store ───────────────────────────────────────────────────
    let backend = LibSqlBackend::new_local(Path::new(&config.db_path))
        .await
        .with_context(|| format!("failed to open keyword database at {}", config.db_path))?;
    let store = KeywordStore::new(Arc::new(backend));
    eprintln!("   Database: {}", config.db_path);

    // ── Slack ───────────────────────────────────────────────────────────
    let slack = Arc::new(SlackClient::new(&config.slack)?);
    eprintln!("   Slack API: {}", config.slack.api_base);

    let router = ChannelRouter::new(config.channels.clone(), store, slack.clone());
    let processor = Arc::new(EventProcessor::new(router, slack));

    // ── Events server ───────────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    eprintln!("   Events: http://{addr}/slack/events\n");
    tracing::info!(%addr, "Events server started");

    axum::serve(listener, event_routes(processor))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("events server failed")?;

    tracing::info!("Events server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
