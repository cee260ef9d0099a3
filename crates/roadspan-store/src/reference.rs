//! JSON reference data files
//!
//! A reference file holds the highway registry and surveyed segments in one
//! document:
//!
//! ```json
//! { "highways": [ ... ], "segments": [ ... ] }
//! ```

use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{HighwayReference, RoadSegment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::memory::{MemoryHighwayStore, MemorySegmentStore};

/// Highway and segment records loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub highways: Vec<HighwayReference>,
    #[serde(default)]
    pub segments: Vec<RoadSegment>,
}

impl ReferenceData {
    /// Load reference data from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RoadspanError::ReferenceDataNotFound { path: path.to_path_buf() });
        }

        let content = fs::read_to_string(path)?;
        let data: ReferenceData = serde_json::from_str(&content)?;
        data.warn_on_suspicious_records();

        tracing::info!(
            path = %path.display(),
            highways = data.highways.len(),
            segments = data.segments.len(),
            "Loaded reference data"
        );
        Ok(data)
    }

    fn warn_on_suspicious_records(&self) {
        let mut seen = HashSet::new();
        for highway in &self.highways {
            if !seen.insert(highway.id) {
                tracing::warn!(highway_id = %highway.id, "Duplicate highway id in reference data");
            }
        }
        for segment in &self.segments {
            if segment.km_end <= segment.km_start {
                tracing::warn!(
                    segment_id = segment.id.0,
                    road_code = %segment.road_code,
                    km_start = segment.km_start,
                    km_end = segment.km_end,
                    "Segment has a non-positive km length and will never be clipped"
                );
            }
        }
    }

    /// Build in-memory stores from the loaded records
    pub fn into_stores(self) -> (MemoryHighwayStore, MemorySegmentStore) {
        (self.highways.into_iter().collect(), self.segments.into_iter().collect())
    }
}
