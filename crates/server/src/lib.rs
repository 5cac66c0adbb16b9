//! Aksa TTS Server
//!
//! Provides the HTTP endpoints for the TTS backend.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use crate::metrics::init_metrics;
pub use state::AppState;

use std::sync::Arc;

use aksa_tts_config::{ModelConfig, ObservabilityConfig};
use aksa_tts_pipeline::{ModelHandle, ModelLoader, PipelineError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the error counter
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::NotFound(_) => "accent_not_found",
            ServerError::Unavailable(_) => "model_unavailable",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Internal(_) => "synthesis",
        }
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::AccentNotFound { accent_id, .. } => ServerError::NotFound(format!(
                "Reference audio for accent '{}' was not found on the server.",
                accent_id
            )),
            PipelineError::ModelUnavailable(reason) => {
                tracing::debug!(reason = %reason, "Rejecting request, model unavailable");
                ServerError::Unavailable("TTS model is not ready (Service Unavailable).".to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self);
        }

        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Load the model in the background and publish readiness once it settles
pub fn start_model_load(
    config: ModelConfig,
    model: Arc<ModelHandle>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = ModelLoader::new(config).spawn(Arc::clone(&model)).await {
            tracing::error!("Model loader task failed: {}", e);
        }
        crate::metrics::record_model_ready(model.is_ready());
    })
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &ObservabilityConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("aksa_tts={},tower_http=debug", config.log_level).into()
    });

    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
