use async_trait::async_trait;
use roadspan_core::error::Result;
use roadspan_core::models::{
    HighwayLookup, HighwayReference, KmRange, RoadClass, RoadMatcher, RoadSegment,
};

/// Port for highway reference records
#[async_trait]
pub trait HighwayStore: Send + Sync {
    /// Find the highway a lookup refers to
    async fn find_highway(&self, lookup: &HighwayLookup) -> Result<Option<HighwayReference>>;

    /// List up to `limit` highways of a class in a region, ordered by road
    /// code. Used for diagnostics when a lookup misses.
    async fn sample_highways(
        &self,
        region_code: &str,
        class: RoadClass,
        limit: usize,
    ) -> Result<Vec<HighwayReference>>;
}

/// Port for surveyed road segments
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Segments in a region whose road identifier matches and whose km range
    /// overlaps `range` (closed intervals), ordered by start km then id
    async fn find_overlapping_segments(
        &self,
        region_code: &str,
        matcher: &RoadMatcher,
        range: KmRange,
    ) -> Result<Vec<RoadSegment>>;

    /// Every segment of a road, ordered by start km then id
    async fn segments_for_road(
        &self,
        region_code: &str,
        matcher: &RoadMatcher,
    ) -> Result<Vec<RoadSegment>>;
}
