use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::dto::{ResolveRequest, ResolveResponse};
use crate::error::ApiError;
use crate::services::ResolveService;
use crate::state::AppState;

pub async fn handle_resolve(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        requests = request.requests.len(),
        concurrent = request.concurrent,
        "Processing resolve request"
    );

    let response = ResolveService::execute(&state, &request).await?;
    Ok(Json(response))
}
