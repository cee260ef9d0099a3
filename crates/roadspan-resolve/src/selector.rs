//! Candidate segment selection

use roadspan_core::config::ResolverSettings;
use roadspan_core::error::Result;
use roadspan_core::models::{HighwayReference, KmRange, RoadMatcher, RoadSegment};
use roadspan_store::SegmentStore;

/// Road-identifier predicate for a highway's segments
pub fn matcher_for(highway: &HighwayReference, settings: &ResolverSettings) -> RoadMatcher {
    RoadMatcher::for_highway(highway, &settings.branch_separator)
}

/// Segments of `highway` overlapping `range`, ordered by start km then id.
/// An empty result is not an error.
pub async fn select_segments(
    segments: &dyn SegmentStore,
    highway: &HighwayReference,
    range: KmRange,
    settings: &ResolverSettings,
) -> Result<Vec<RoadSegment>> {
    let matcher = matcher_for(highway, settings);
    let mut candidates = segments
        .find_overlapping_segments(&highway.region_code, &matcher, range)
        .await?;

    // adapters already order rows; keep the contract even if one does not
    candidates.sort_by(|a, b| a.km_start.total_cmp(&b.km_start).then(a.id.cmp(&b.id)));

    tracing::debug!(
        road_code = %highway.road_code,
        region = %highway.region_code,
        %range,
        candidates = candidates.len(),
        "Selected candidate segments"
    );
    Ok(candidates)
}
