use futures::future::join_all;
use roadspan_core::config::ResolverSettings;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{
    Geometry, HighwayId, HighwayLookup, HighwayReference, KmRange, ResolutionOutcome,
    ResolvedGeometry, SkipReason, Tier, WorkLocationRequest,
};
use roadspan_geo::transform::CrsNormalizer;
use roadspan_store::{HighwayStore, SegmentStore};
use std::sync::Arc;
use tracing::Instrument;

use crate::clipper::clip_all;
use crate::compositor::compose;
use crate::fallback::FallbackLadder;
use crate::locate::{self, KmPosition};
use crate::resolver::resolve_highway;
use crate::selector::{matcher_for, select_segments};
use crate::validation::{validate_km_range, KmValidation};

/// Resolves work-location requests against the highway reference stores.
///
/// Holds no mutable state; one instance can serve concurrent callers.
#[derive(Clone)]
pub struct Resolver {
    highways: Arc<dyn HighwayStore>,
    segments: Arc<dyn SegmentStore>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        highways: Arc<dyn HighwayStore>,
        segments: Arc<dyn SegmentStore>,
        settings: ResolverSettings,
    ) -> Self {
        Self { highways, segments, settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve requests one after another, one outcome per request in order
    pub async fn resolve(&self, requests: &[WorkLocationRequest]) -> Vec<ResolutionOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            outcomes.push(self.resolve_indexed(index, request).await);
        }
        outcomes
    }

    /// Resolve requests concurrently; outcomes match [`Resolver::resolve`]
    pub async fn resolve_concurrent(&self, requests: &[WorkLocationRequest]) -> Vec<ResolutionOutcome> {
        join_all(
            requests
                .iter()
                .enumerate()
                .map(|(index, request)| self.resolve_indexed(index, request)),
        )
        .await
    }

    async fn resolve_indexed(&self, index: usize, request: &WorkLocationRequest) -> ResolutionOutcome {
        let span = tracing::info_span!("resolve", index, kind = request.kind());
        self.resolve_one(request).instrument(span).await
    }

    /// Resolve a single request. Never fails: problems surface as a
    /// `Skipped` outcome or a lower tier.
    pub async fn resolve_one(&self, request: &WorkLocationRequest) -> ResolutionOutcome {
        let request = match request.normalized() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid work location request");
                return ResolutionOutcome::skipped(SkipReason::InvalidRequest {
                    detail: e.to_string(),
                });
            }
        };

        let range = match &request {
            WorkLocationRequest::FixedPoint { latitude, longitude, .. } => {
                let point = Geometry::point(*longitude, *latitude);
                return ResolvedGeometry::new(point, Tier::Exact).into();
            }
            other => match other.km_range() {
                Some(range) => range,
                None => return ResolutionOutcome::unresolved(),
            },
        };

        let highway = match resolve_highway(&request, self.highways.as_ref(), &self.settings).await {
            Ok(highway) => highway,
            Err(RoadspanError::HighwayNotFound { lookup }) => {
                tracing::warn!(%lookup, "Highway not found, work location will not be created");
                return ResolutionOutcome::skipped(SkipReason::HighwayNotFound { lookup });
            }
            Err(RoadspanError::InvalidRequest { reason }) => {
                tracing::warn!(%reason, "Skipping invalid work location request");
                return ResolutionOutcome::skipped(SkipReason::InvalidRequest { detail: reason });
            }
            Err(e) => {
                tracing::error!(error = %e, "Highway lookup failed");
                return ResolutionOutcome::skipped(SkipReason::LookupFailed {
                    detail: e.to_string(),
                });
            }
        };

        let outcome: ResolutionOutcome = self.resolve_on_highway(&highway, range).await.into();
        tracing::info!(
            road_code = %highway.road_code,
            region = %highway.region_code,
            %range,
            tier = ?outcome.tier(),
            "Resolved work location"
        );
        outcome
    }

    /// Exact geometry from segments, else the fallback ladder
    async fn resolve_on_highway(&self, highway: &HighwayReference, range: KmRange) -> Option<ResolvedGeometry> {
        match self.exact(highway, range).await {
            Ok(resolved) => return Some(resolved),
            Err(e) if e.is_recoverable() => {
                tracing::debug!(error = %e, "No exact geometry, falling back")
            }
            Err(e) => tracing::warn!(error = %e, "Segment lookup failed, falling back"),
        }
        FallbackLadder::new(highway, range, &self.settings).resolve()
    }

    async fn exact(&self, highway: &HighwayReference, range: KmRange) -> Result<ResolvedGeometry> {
        let candidates = select_segments(self.segments.as_ref(), highway, range, &self.settings).await?;
        let pieces = clip_all(&candidates, range);
        compose(&pieces, highway, range, &CrsNormalizer::from(&self.settings))
    }

    async fn highway_by_id(&self, id: HighwayId) -> Result<HighwayReference> {
        let lookup = HighwayLookup::ById(id);
        self.highways
            .find_highway(&lookup)
            .await?
            .ok_or_else(|| RoadspanError::HighwayNotFound { lookup: lookup.to_string() })
    }

    /// Check a km range against a highway's segments or registered extent
    pub async fn validate_km(&self, highway_id: HighwayId, range: KmRange) -> Result<KmValidation> {
        let highway = self.highway_by_id(highway_id).await?;
        let matcher = matcher_for(&highway, &self.settings);
        let segments = self.segments.segments_for_road(&highway.region_code, &matcher).await?;
        validate_km_range(&highway, &segments, range)
    }

    /// Resolve a range request and require a geometry for it
    async fn resolved_line(&self, request: &WorkLocationRequest) -> Result<(Geometry, KmRange, Tier)> {
        let request = request.normalized()?;
        let range = request.km_range().ok_or_else(|| RoadspanError::InvalidRequest {
            reason: format!("{} locations have no km range", request.kind()),
        })?;

        match self.resolve_one(&request).await {
            ResolutionOutcome::Created { geometry: Some(geometry), tier, .. } => Ok((geometry, range, tier)),
            ResolutionOutcome::Created { geometry: None, .. } => {
                Err(RoadspanError::NoGeometryAvailable { road: format!("{} {}", request.kind(), range) })
            }
            ResolutionOutcome::Skipped { reason } => match reason {
                SkipReason::HighwayNotFound { lookup } => Err(RoadspanError::HighwayNotFound { lookup }),
                SkipReason::InvalidRequest { detail } => Err(RoadspanError::InvalidRequest { reason: detail }),
                SkipReason::LookupFailed { detail } => Err(RoadspanError::Store(detail)),
            },
        }
    }

    /// Coordinate at a km mark of a work location
    pub async fn point_at_km(&self, request: &WorkLocationRequest, km: f64) -> Result<(KmPosition, Tier)> {
        let (geometry, range, tier) = self.resolved_line(request).await?;
        Ok((locate::point_at_km(&geometry, range, km)?, tier))
    }

    /// Km mark of the point on a work location closest to a coordinate
    pub async fn locate_km(
        &self,
        request: &WorkLocationRequest,
        latitude: f64,
        longitude: f64,
    ) -> Result<(KmPosition, Tier)> {
        let (geometry, range, tier) = self.resolved_line(request).await?;
        Ok((locate::locate_km(&geometry, range, latitude, longitude)?, tier))
    }
}
