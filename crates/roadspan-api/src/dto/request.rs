use roadspan_core::models::{KmRange, WorkLocationRequest};
use serde::Deserialize;

/// Batch resolution request body
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub requests: Vec<WorkLocationRequest>,
    /// Resolve requests concurrently instead of one after another
    #[serde(default)]
    pub concurrent: bool,
}

/// Kilometer range to check against a highway
#[derive(Debug, Deserialize)]
pub struct ValidateKmRequest {
    pub km_start: f64,
    pub km_end: f64,
}

impl ValidateKmRequest {
    pub fn km_range(&self) -> KmRange {
        KmRange::new(self.km_start, self.km_end)
    }
}

/// Coordinate at a km mark of a work location
#[derive(Debug, Deserialize)]
pub struct PointAtKmRequest {
    pub location: WorkLocationRequest,
    pub km: f64,
}

/// Km mark nearest to a coordinate on a work location
#[derive(Debug, Deserialize)]
pub struct LocateKmRequest {
    pub location: WorkLocationRequest,
    pub latitude: f64,
    pub longitude: f64,
}
