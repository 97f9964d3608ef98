//! Refund reconciliation server.
//!
//! Main entry point for the refund service.

mod seed;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use refund_api::{AppState, create_router};
use refund_core::reconciliation::RefundOrchestrator;
use refund_shared::AppConfig;
use refund_shared::config::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(config.logging.format);

    let orchestrator = RefundOrchestrator::in_memory();
    if config.ledger.seed_demo_data {
        let settlement = config
            .ledger
            .settlement_currency
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid ledger.settlement_currency")?;
        let count = seed::load(&orchestrator, &settlement)?;
        info!(count, settlement_currency = %settlement, "Seeded demo transactions");
    }

    let app = create_router(AppState::new(orchestrator), &config.cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "refund=debug,refund_core=debug,refund_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
