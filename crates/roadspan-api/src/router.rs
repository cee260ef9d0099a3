use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Resolution
        .route("/api/v1/resolve", post(handlers::handle_resolve))

        // Reference data checks
        .route("/api/v1/highways/{id}/validate-km", post(handlers::validate_km))

        // Linear referencing on resolved geometry
        .route("/api/v1/locate/point", post(handlers::point_at_km))
        .route("/api/v1/locate/km", post(handlers::locate_km))

        .with_state(state)
}
