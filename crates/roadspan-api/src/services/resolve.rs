use roadspan_core::models::ResolutionOutcome;

use crate::dto::{ResolveRequest, ResolveResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Largest batch accepted in one request
pub const MAX_BATCH_SIZE: usize = 1000;

/// Service for batch resolution
pub struct ResolveService;

impl ResolveService {
    /// Resolve a batch and render the outcomes
    pub async fn execute(state: &AppState, request: &ResolveRequest) -> Result<ResolveResponse, ApiError> {
        if request.requests.len() > MAX_BATCH_SIZE {
            return Err(ApiError::bad_request("Too many work locations").with_details(format!(
                "{} requests submitted, at most {} are accepted",
                request.requests.len(),
                MAX_BATCH_SIZE
            )));
        }

        let outcomes: Vec<ResolutionOutcome> = if request.concurrent {
            state.resolver.resolve_concurrent(&request.requests).await
        } else {
            state.resolver.resolve(&request.requests).await
        };

        let response = ResolveResponse::from_outcomes(&outcomes);
        tracing::info!(
            requests = request.requests.len(),
            created = response.report.created(),
            skipped = response.report.skipped.len(),
            "Resolved work locations"
        );
        Ok(response)
    }
}
