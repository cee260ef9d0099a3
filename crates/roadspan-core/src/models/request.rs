use serde::{Deserialize, Serialize};

use super::highway::{HighwayId, KmRange};
use crate::error::{Result, RoadspanError};

/// Selector describing where a work location is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkLocationRequest {
    /// Federal road identified by region and route number
    Federal {
        region_code: String,
        route_code: String,
        km_start: f64,
        km_end: f64,
    },
    /// State road identified directly by its highway record
    State {
        highway_id: HighwayId,
        km_start: f64,
        km_end: f64,
    },
    /// A coordinate with no linear referencing
    FixedPoint {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        label: Option<String>,
    },
}

impl WorkLocationRequest {
    /// Requested kilometer interval, for range-based kinds
    pub fn km_range(&self) -> Option<KmRange> {
        match self {
            WorkLocationRequest::Federal { km_start, km_end, .. }
            | WorkLocationRequest::State { km_start, km_end, .. } => {
                Some(KmRange::new(*km_start, *km_end))
            }
            WorkLocationRequest::FixedPoint { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkLocationRequest::Federal { .. } => "FEDERAL",
            WorkLocationRequest::State { .. } => "STATE",
            WorkLocationRequest::FixedPoint { .. } => "FIXED_POINT",
        }
    }

    /// Validate the request and return it with a reversed km range swapped
    /// into ascending order.
    pub fn normalized(&self) -> Result<Self> {
        match self {
            WorkLocationRequest::Federal { region_code, route_code, .. } => {
                if region_code.trim().is_empty() {
                    return Err(invalid("region code is empty"));
                }
                if route_code.trim().is_empty() {
                    return Err(invalid("route code is empty"));
                }
                let range = checked_range(self)?;
                Ok(WorkLocationRequest::Federal {
                    region_code: region_code.trim().to_uppercase(),
                    route_code: route_code.trim().to_string(),
                    km_start: range.start,
                    km_end: range.end,
                })
            }
            WorkLocationRequest::State { highway_id, .. } => {
                let range = checked_range(self)?;
                Ok(WorkLocationRequest::State {
                    highway_id: *highway_id,
                    km_start: range.start,
                    km_end: range.end,
                })
            }
            WorkLocationRequest::FixedPoint { latitude, longitude, .. } => {
                // taken as given: any finite coordinate becomes the point
                if !latitude.is_finite() || !longitude.is_finite() {
                    return Err(invalid("coordinates must be finite"));
                }
                Ok(self.clone())
            }
        }
    }
}

fn checked_range(request: &WorkLocationRequest) -> Result<KmRange> {
    let range = request.km_range().ok_or_else(|| invalid("request has no km range"))?;
    if !range.is_finite() {
        return Err(invalid(format!("km range {} is not finite", range)));
    }
    if range.is_reversed() {
        tracing::warn!(
            km_start = range.start,
            km_end = range.end,
            "Reversed km range in work location request, swapping"
        );
    }
    Ok(range.normalized())
}

fn invalid(reason: impl Into<String>) -> RoadspanError {
    RoadspanError::InvalidRequest { reason: reason.into() }
}
