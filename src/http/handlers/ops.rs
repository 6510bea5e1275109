use crate::latency::prober::LatencySource;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "providers": state.aggregator.providers.len(),
            "timestamp": chrono::Utc::now(),
        })),
    )
}

/// Combined carbon + latency snapshot across all zones and POPs.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (intensities, latencies) = tokio::join!(
        state.aggregator.all_intensities(),
        state.prober.probe_all()
    );

    (
        axum::http::StatusCode::OK,
        Json(json!({
            "carbon_intensities": intensities,
            "latencies": latencies,
            "timestamp": chrono::Utc::now(),
        })),
    )
}
