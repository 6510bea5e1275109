use crate::domain::decision::Policy;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct RouteQuery {
    pub policy: Option<String>,
    pub log_suffix: Option<String>,
}

pub async fn route_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<RouteQuery>,
) -> impl IntoResponse {
    let policy = match query.policy.as_deref() {
        None => Policy::Weighted,
        Some(raw) => match Policy::parse(raw) {
            Some(p) => p,
            None => {
                return (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": format!("unknown policy '{}', expected weighted|latency|carbon", raw)
                    })),
                )
                    .into_response();
            }
        },
    };

    let decision = state
        .engine
        .route(&video_id, policy, query.log_suffix.as_deref())
        .await;
    (axum::http::StatusCode::OK, Json(decision)).into_response()
}
