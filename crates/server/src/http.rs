//! HTTP Endpoints
//!
//! REST API for the TTS backend.

use std::time::Instant;

use aksa_tts_config::constants;
use aksa_tts_core::TtsRequest;
use aksa_tts_pipeline::{chunk_stream, ModelState};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::{
    metrics_handler, record_audio_duration, record_error, record_render_latency, record_request,
};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_enabled = state.config.server.cors_enabled;

    let router = Router::new()
        .route("/", get(read_root))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        // Speech synthesis, with and without the trailing slash
        .route("/stream-speech/", post(stream_speech))
        .route("/stream-speech", post(stream_speech))
        .layer(TraceLayer::new_for_http());

    let router = if cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}

/// Liveness check
async fn read_root() -> impl IntoResponse {
    record_request("root");
    Json(serde_json::json!({
        "status": constants::server::STATUS_MESSAGE,
    }))
}

/// Readiness check (model state)
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_state = state.model.state();

    let body = match &model_state {
        ModelState::Ready { name, sample_rate } => serde_json::json!({
            "status": model_state.label(),
            "model": name,
            "sample_rate": sample_rate,
        }),
        ModelState::Failed(reason) => serde_json::json!({
            "status": model_state.label(),
            "reason": reason,
        }),
        ModelState::Loading => serde_json::json!({
            "status": model_state.label(),
        }),
    };

    let status = if model_state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body))
}

/// Synthesize `text` in the requested accent and stream it back as WAV
async fn stream_speech(
    State(state): State<AppState>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    record_request("stream_speech");

    let result = render_speech(&state, payload).await;
    if let Err(err) = &result {
        record_error(err.kind());
    }
    result
}

async fn render_speech(
    state: &AppState,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    // Readiness is checked before the body is looked at
    state.model.model()?;

    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let start = Instant::now();
    let audio = state.pipeline.render(&request).await?;
    record_render_latency(start.elapsed().as_secs_f64());
    record_audio_duration(audio.duration_secs());

    let audio_config = &state.config.audio;
    let body = Body::from_stream(chunk_stream(
        audio.into_bytes(),
        audio_config.chunk_size_bytes,
        audio_config.chunk_pause(),
    ));

    Ok(([(header::CONTENT_TYPE, "audio/wav")], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aksa_tts_config::Settings;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(Settings::default());
        let _router = create_router(state);
    }

    #[test]
    fn test_router_without_cors() {
        let mut settings = Settings::default();
        settings.server.cors_enabled = false;
        let _router = create_router(AppState::new(settings));
    }
}
