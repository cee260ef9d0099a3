use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use roadspan_core::models::HighwayId;

use crate::dto::{ValidateKmRequest, ValidateKmResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/highways/{id}/validate-km
pub async fn validate_km(
    State(state): State<Arc<AppState>>,
    Path(highway_id): Path<u64>,
    payload: Result<Json<ValidateKmRequest>, JsonRejection>,
) -> Result<Json<ValidateKmResponse>, ApiError> {
    let Json(request) = payload?;
    let range = request.km_range();
    tracing::info!(highway_id, %range, "Validating km range");

    let validation = state.resolver.validate_km(HighwayId(highway_id), range).await?;
    Ok(Json(ValidateKmResponse { highway_id, validation }))
}
