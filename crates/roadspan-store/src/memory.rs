//! In-memory storage implementations for development and testing.

use async_trait::async_trait;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{
    HighwayId, HighwayLookup, HighwayReference, KmRange, RoadClass, RoadMatcher, RoadSegment,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::ports::{HighwayStore, SegmentStore};

fn poisoned<T>(_: PoisonError<T>) -> RoadspanError {
    RoadspanError::Store("in-memory store lock poisoned".to_string())
}

/// In-memory implementation of HighwayStore
#[derive(Debug, Clone, Default)]
pub struct MemoryHighwayStore {
    highways: Arc<RwLock<HashMap<HighwayId, HighwayReference>>>,
}

impl MemoryHighwayStore {
    /// Create an empty in-memory highway store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a highway record
    pub fn insert(&self, highway: HighwayReference) -> Result<()> {
        let mut highways = self.highways.write().map_err(poisoned)?;
        if highways.insert(highway.id, highway).is_some() {
            tracing::warn!("Replaced existing highway record in memory store");
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.highways.read().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<HighwayReference> for MemoryHighwayStore {
    fn from_iter<I: IntoIterator<Item = HighwayReference>>(iter: I) -> Self {
        let highways = iter.into_iter().map(|h| (h.id, h)).collect();
        Self { highways: Arc::new(RwLock::new(highways)) }
    }
}

#[async_trait]
impl HighwayStore for MemoryHighwayStore {
    async fn find_highway(&self, lookup: &HighwayLookup) -> Result<Option<HighwayReference>> {
        let highways = self.highways.read().map_err(poisoned)?;

        let found = match lookup {
            HighwayLookup::ById(id) => highways.get(id).cloned(),
            HighwayLookup::ByCode { region_code, class, road_code } => highways
                .values()
                .filter(|h| {
                    h.class == *class
                        && h.region_code.eq_ignore_ascii_case(region_code)
                        && h.road_code == *road_code
                })
                // lowest id wins when the registry holds duplicates
                .min_by_key(|h| h.id)
                .cloned(),
        };

        Ok(found)
    }

    async fn sample_highways(
        &self,
        region_code: &str,
        class: RoadClass,
        limit: usize,
    ) -> Result<Vec<HighwayReference>> {
        let highways = self.highways.read().map_err(poisoned)?;

        let mut sample: Vec<HighwayReference> = highways
            .values()
            .filter(|h| h.class == class && h.region_code.eq_ignore_ascii_case(region_code))
            .cloned()
            .collect();
        sample.sort_by(|a, b| a.road_code.cmp(&b.road_code).then(a.id.cmp(&b.id)));
        sample.truncate(limit);

        Ok(sample)
    }
}

/// In-memory implementation of SegmentStore
#[derive(Debug, Clone, Default)]
pub struct MemorySegmentStore {
    segments: Arc<RwLock<Vec<RoadSegment>>>,
}

impl MemorySegmentStore {
    /// Create an empty in-memory segment store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surveyed segment
    pub fn insert(&self, segment: RoadSegment) -> Result<()> {
        self.segments.write().map_err(poisoned)?.push(segment);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(
        &self,
        region_code: &str,
        matcher: &RoadMatcher,
        range: Option<KmRange>,
    ) -> Result<Vec<RoadSegment>> {
        let segments = self.segments.read().map_err(poisoned)?;

        let mut selected: Vec<RoadSegment> = segments
            .iter()
            .filter(|s| s.region_code.eq_ignore_ascii_case(region_code))
            .filter(|s| matcher.matches(&s.road_code))
            .filter(|s| range.map_or(true, |r| r.overlaps(&s.km_range())))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.km_start.total_cmp(&b.km_start).then(a.id.cmp(&b.id)));

        Ok(selected)
    }
}

impl FromIterator<RoadSegment> for MemorySegmentStore {
    fn from_iter<I: IntoIterator<Item = RoadSegment>>(iter: I) -> Self {
        Self { segments: Arc::new(RwLock::new(iter.into_iter().collect())) }
    }
}

#[async_trait]
impl SegmentStore for MemorySegmentStore {
    async fn find_overlapping_segments(
        &self,
        region_code: &str,
        matcher: &RoadMatcher,
        range: KmRange,
    ) -> Result<Vec<RoadSegment>> {
        self.select(region_code, matcher, Some(range))
    }

    async fn segments_for_road(
        &self,
        region_code: &str,
        matcher: &RoadMatcher,
    ) -> Result<Vec<RoadSegment>> {
        self.select(region_code, matcher, None)
    }
}
