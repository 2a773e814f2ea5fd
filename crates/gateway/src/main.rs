//! TextSum API Gateway
//!
//! Entry point of the summary service. Handles:
//! - Configuration and logging setup
//! - Store, summarizer and enrichment wiring
//! - Serving HTTP until Ctrl+C/SIGTERM, then draining enrichment

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use textsum_common::{
    config::{AppConfig, ObservabilityConfig},
    db::connect_store,
    metrics::{self, ENRICHMENT_BUCKETS, METRICS_PREFIX},
    summarizer::create_summarizer,
    EnrichmentDispatcher, EnrichmentWorker, SummaryService,
};
use textsum_gateway::{create_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration, from an explicit file when one is given
    let config = match std::env::var("APP_CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path)?,
        Err(_) => AppConfig::load()?,
    };
    let config = Arc::new(config);

    init_tracing(&config.observability);
    info!(
        service = %config.observability.service_name,
        environment = %config.environment.name,
        "Starting TextSum API Gateway v{}",
        textsum_common::VERSION
    );

    // Initialize metrics
    install_metrics_exporter(&config.observability)?;
    metrics::register_metrics();

    // Storage and enrichment
    let store = connect_store(&config.database).await?;
    let summarizer = create_summarizer(&config.summarizer)?;
    info!(provider = summarizer.name(), "Summarizer ready");

    let worker = EnrichmentWorker::new(store.clone(), summarizer, config.summarizer_timeout());
    let dispatcher = Arc::new(EnrichmentDispatcher::new(worker));
    let service = Arc::new(SummaryService::new(store.clone(), dispatcher.clone()));

    // Create app state
    let state = AppState {
        config: config.clone(),
        service,
        store,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    dispatcher.shutdown(config.shutdown_timeout()).await;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_metrics_exporter(config: &ObservabilityConfig) -> anyhow::Result<()> {
    if config.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_enrichment_duration_seconds", METRICS_PREFIX)),
            ENRICHMENT_BUCKETS,
        )?
        .install()?;

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
