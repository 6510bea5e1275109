use crate::carbon::aggregator::CarbonSource;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ZoneQuery {
    pub zone: String,
}

pub async fn get_carbon(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> impl IntoResponse {
    let intensity = state.aggregator.zone_intensity(&query.zone).await;
    (axum::http::StatusCode::OK, Json(intensity))
}

pub async fn get_all_carbon(State(state): State<AppState>) -> impl IntoResponse {
    let intensities = state.aggregator.all_intensities().await;
    (axum::http::StatusCode::OK, Json(intensities))
}
