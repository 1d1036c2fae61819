//! TextGuard Server
//!
//! HTTP front end for the TextGuard classification pipeline: loads the
//! model once at startup, exposes `POST /api/v1/predict` plus health and
//! metrics endpoints, and translates pipeline failures into status codes.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod config;
mod routes;

use config::ServerConfig;
use routes::AppState;
use textguard_inference::ClassifierService;

#[derive(Parser, Debug)]
#[command(name = "textguard-server")]
#[command(about = "TextGuard text classification server", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Model directory (overrides the configured model source)
    #[arg(short, long)]
    model_dir: Option<String>,

    /// Label map path
    #[arg(long)]
    label_map: Option<String>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting TextGuard Server");

    // Load configuration
    let config = ServerConfig::load(&cli)?;
    info!("Configuration loaded successfully");
    info!("Model: {}", config.model.name);
    info!("Label map: {}", config.model.label_map_path.display());

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Load the model; a failed initialization is fatal. The process must
    // never reach a listening state without a ready classifier.
    info!("Loading classification model...");
    let service = ClassifierService::initialize(&config.model);
    if let Some(reason) = service.failure() {
        error!("Refusing to start: {}", reason);
        anyhow::bail!("classifier initialization failed: {}", reason);
    }
    info!("Classifier initialized successfully");

    let state = AppState {
        service: Arc::new(service),
        metrics: metrics_handle,
    };

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("textguard=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("textguard=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "textguard_requests_total",
        "Total number of prediction requests received"
    );
    metrics::describe_counter!(
        "textguard_predictions_total",
        "Total number of predictions by outcome"
    );
    metrics::describe_histogram!(
        "textguard_prediction_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end prediction latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
