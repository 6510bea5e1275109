use crate::latency::prober::LatencySource;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct PopQuery {
    pub pop: String,
}

pub async fn get_latency(
    State(state): State<AppState>,
    Query(query): Query<PopQuery>,
) -> impl IntoResponse {
    if !state.prober.knows_pop(&query.pop) {
        return (
            axum::http::StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown pop '{}'", query.pop) })),
        )
            .into_response();
    }

    let snapshot = match state.prober.snapshot().await {
        Some(snapshot) => snapshot,
        None => {
            // Nothing cached yet: probe once so the first call still answers.
            state.prober.probe_all().await;
            match state.prober.snapshot().await {
                Some(snapshot) => snapshot,
                None => {
                    return (
                        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "latency probe produced no result" })),
                    )
                        .into_response();
                }
            }
        }
    };

    let (observed_at, latencies) = snapshot;
    match latencies.get(&query.pop) {
        Some(latency_ms) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "pop": query.pop,
                "latency_ms": latency_ms,
                "observed_at": observed_at,
            })),
        )
            .into_response(),
        None => (
            axum::http::StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no latency reading for pop '{}'", query.pop) })),
        )
            .into_response(),
    }
}
