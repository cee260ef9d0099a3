use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dto::{LocateKmRequest, PointAtKmRequest, PositionResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/locate/point - coordinate at a km mark
pub async fn point_at_km(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PointAtKmRequest>, JsonRejection>,
) -> Result<Json<PositionResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::debug!(kind = request.location.kind(), km = request.km, "Locating point at km");

    let (position, tier) = state.resolver.point_at_km(&request.location, request.km).await?;
    Ok(Json(PositionResponse::new(position, tier)))
}

/// POST /api/v1/locate/km - km mark nearest a coordinate
pub async fn locate_km(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LocateKmRequest>, JsonRejection>,
) -> Result<Json<PositionResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::debug!(
        kind = request.location.kind(),
        latitude = request.latitude,
        longitude = request.longitude,
        "Locating km for coordinate"
    );

    let (position, tier) = state
        .resolver
        .locate_km(&request.location, request.latitude, request.longitude)
        .await?;
    Ok(Json(PositionResponse::new(position, tier)))
}
