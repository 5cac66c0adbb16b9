//! Aksa TTS Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use aksa_tts_config::load_settings;
use aksa_tts_pipeline::ModelHandle;
use aksa_tts_server::{create_router, init_metrics, init_tracing, start_model_load, AppState};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (need observability settings for tracing init)
    let env = std::env::var("AKSA_TTS_ENV").ok();
    let config = load_settings(env.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.observability);

    tracing::info!("Starting Aksa TTS Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(engine = %config.model.engine, "Loaded configuration");

    if config.observability.metrics_enabled {
        init_metrics().context("Failed to install Prometheus recorder")?;
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    let model = Arc::new(ModelHandle::new());
    let state = AppState::with_model(config.clone(), Arc::clone(&model));

    let resolver = state.pipeline.resolver();
    resolver
        .ensure_reference_dir()
        .with_context(|| format!("Failed to create {}", config.audio.reference_dir))?;
    tracing::info!(
        reference_dir = %resolver.reference_dir().display(),
        accents = ?resolver.library().ids(),
        "Accent library loaded"
    );

    // Loads in the background; `/` answers immediately, synthesis gets 503
    // until the handle is filled
    start_model_load(config.model.clone(), model);

    let app = create_router(state);

    let ip: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server host '{}'", config.server.host))?;
    let addr = SocketAddr::from((ip, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
