//! Observability Metrics
//!
//! Prometheus metrics endpoint for monitoring.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::state::AppState;

/// Global Prometheus handle
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics recorder
///
/// Installs the global recorder on the first call; later calls return the
/// same handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;

    register_default_metrics();

    Ok(METRICS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the global metrics handle
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

fn register_default_metrics() {
    gauge!("aksa_tts_model_ready").set(0.0);

    counter!("aksa_tts_requests_total", "endpoint" => "root").absolute(0);
    counter!("aksa_tts_requests_total", "endpoint" => "stream_speech").absolute(0);

    histogram!("aksa_tts_render_duration_seconds").record(0.0);
    histogram!("aksa_tts_audio_duration_seconds").record(0.0);

    counter!("aksa_tts_errors_total", "type" => "accent_not_found").absolute(0);
    counter!("aksa_tts_errors_total", "type" => "model_unavailable").absolute(0);
    counter!("aksa_tts_errors_total", "type" => "invalid_request").absolute(0);
    counter!("aksa_tts_errors_total", "type" => "synthesis").absolute(0);
}

/// Record request to endpoint
pub fn record_request(endpoint: &'static str) {
    counter!("aksa_tts_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record synthesis + encoding latency
pub fn record_render_latency(duration_secs: f64) {
    histogram!("aksa_tts_render_duration_seconds").record(duration_secs);
}

/// Record length of the generated audio
pub fn record_audio_duration(duration_secs: f64) {
    histogram!("aksa_tts_audio_duration_seconds").record(duration_secs);
}

/// Record error by type
pub fn record_error(error_type: &'static str) {
    counter!("aksa_tts_errors_total", "type" => error_type).increment(1);
}

/// Publish model readiness
pub fn record_model_ready(ready: bool) {
    gauge!("aksa_tts_model_ready").set(if ready { 1.0 } else { 0.0 });
}

/// Metrics endpoint handler
///
/// Returns Prometheus-formatted metrics.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    record_model_ready(state.model.is_ready());

    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_helpers() {
        // No recorder installed, these must be no-ops
        record_request("test");
        record_render_latency(0.4);
        record_audio_duration(1.2);
        record_error("test");
        record_model_ready(true);
    }

    #[test]
    fn test_default_metrics_cover_error_kinds() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, register_default_metrics);
        let rendered = handle.render();

        for kind in ["accent_not_found", "model_unavailable", "invalid_request", "synthesis"] {
            let series = format!("aksa_tts_errors_total{{type=\"{}\"}} 0", kind);
            assert!(rendered.contains(&series), "missing {}", series);
        }
        assert!(rendered.contains("aksa_tts_model_ready 0"));
    }

    #[test]
    fn test_model_ready_gauge() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            register_default_metrics();
            record_model_ready(true);
        });

        assert!(handle.render().contains("aksa_tts_model_ready 1"));
    }
}
