use chrono::{DateTime, Utc};
use roadspan_core::models::{
    CompositeAttributes, Geometry, ResolutionOutcome, ResolutionReport, SkipReason, Tier,
};
use roadspan_geo::models::to_geojson_geometry;
use roadspan_resolve::{KmPosition, KmValidation};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub storage: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok(storage: &'static str) -> Self {
        Self { status: "ok", service: "roadspan-api", storage, timestamp: Utc::now() }
    }
}

/// One request's outcome with its geometry rendered as GeoJSON
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub index: usize,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    pub geometry: Option<geojson::Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<CompositeAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
}

impl OutcomeResponse {
    pub fn new(index: usize, outcome: &ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::Created { geometry, tier, attributes } => Self {
                index,
                status: "CREATED",
                tier: Some(*tier),
                geometry: geometry.as_ref().map(to_geojson_geometry),
                attributes: attributes.clone(),
                reason: None,
            },
            ResolutionOutcome::Skipped { reason } => Self {
                index,
                status: "SKIPPED",
                tier: None,
                geometry: None,
                attributes: None,
                reason: Some(reason.clone()),
            },
        }
    }
}

/// Batch resolution response
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub outcomes: Vec<OutcomeResponse>,
    pub report: ResolutionReport,
}

impl ResolveResponse {
    pub fn from_outcomes(outcomes: &[ResolutionOutcome]) -> Self {
        Self {
            outcomes: outcomes
                .iter()
                .enumerate()
                .map(|(index, outcome)| OutcomeResponse::new(index, outcome))
                .collect(),
            report: ResolutionReport::from_outcomes(outcomes),
        }
    }
}

/// Km range validation response
#[derive(Debug, Serialize)]
pub struct ValidateKmResponse {
    pub highway_id: u64,
    #[serde(flatten)]
    pub validation: KmValidation,
}

/// A km mark and its coordinate, with the tier of the geometry it was
/// measured on
#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub km: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub tier: Tier,
    pub point: geojson::Geometry,
}

impl PositionResponse {
    pub fn new(position: KmPosition, tier: Tier) -> Self {
        Self {
            km: position.km,
            latitude: position.latitude,
            longitude: position.longitude,
            tier,
            point: to_geojson_geometry(&Geometry::point(position.longitude, position.latitude)),
        }
    }
}
