//! CRUP: Cognitive Research Unification Platform
//! Entry point for the web server binary.

mod config;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crup_ingestion::IntakeSession;
use crup_query::QueryDispatcher;
use crup_web::router::build_router;
use crup_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crup=debug,info")),
        )
        .init();

    info!("CRUP starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load()?;
    info!(
        domains = config.domains.len(),
        failure_rate = config.intake.failure_rate,
        latency_ms = config.query.latency_ms,
        "Configuration loaded"
    );

    let session = IntakeSession::new(&config.domains, config.intake.clone());
    let dispatcher = QueryDispatcher::new(config.query.clone());
    let state = AppState::new(session, dispatcher, config.web_settings());
    let router = build_router(state);

    // Start web server
    let bind_addr = std::env::var("CRUP_BIND")
        .unwrap_or_else(|_| config.server.bind.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Web GUI listening on http://{}", bind_addr);
    info!("   Dashboard:  http://{}/", bind_addr);
    info!("   Events:     http://{}/api/events", bind_addr);
    info!("   Health:     http://{}/api/health", bind_addr);
    info!("CRUP ready. Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("CRUP stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
    }
}
