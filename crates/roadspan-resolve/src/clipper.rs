//! Linear-referencing clipper
//!
//! A segment surveyed from km `s` to km `e` is assumed to be laid out
//! uniformly along its line, so km `k` sits at arc-length fraction
//! `(k - s) / (e - s)` of the merged segment geometry.

use geo::LineString;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{Geometry, KmRange, RoadSegment, SegmentId};
use roadspan_geo::linear::{line_substring, merge_lines};
use roadspan_geo::models::lines_of;

/// The part of a segment that falls inside a requested range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    /// Kilometers actually covered
    pub km_range: KmRange,
    pub start_fraction: f64,
    pub end_fraction: f64,
}

/// A clipped segment line, still in the segment's source CRS
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedPiece {
    pub segment_id: SegmentId,
    pub km_range: KmRange,
    pub line: LineString,
    pub srid: u32,
}

/// Intersect a segment's km range with the requested one.
///
/// `None` when they share no positive-length interval or the segment itself
/// has no positive length.
pub fn clip_window(segment: &RoadSegment, requested: KmRange) -> Option<ClipWindow> {
    let length = segment.km_end - segment.km_start;
    if !(length > 0.0) {
        return None;
    }

    let clip_start = requested.start.max(segment.km_start);
    let clip_end = requested.end.min(segment.km_end);
    if !(clip_end > clip_start) {
        return None;
    }

    Some(ClipWindow {
        km_range: KmRange::new(clip_start, clip_end),
        start_fraction: ((clip_start - segment.km_start) / length).clamp(0.0, 1.0),
        end_fraction: ((clip_end - segment.km_start) / length).clamp(0.0, 1.0),
    })
}

/// Merge a linear geometry into one line and cut it between two fractions
pub fn cut_line(geometry: &Geometry, start_fraction: f64, end_fraction: f64) -> Result<LineString> {
    let parts = lines_of(geometry)?;
    let merged = merge_lines(&parts)?;
    line_substring(&merged, start_fraction, end_fraction)
}

/// Clip one segment to the requested range.
///
/// `Ok(None)` when the segment does not contribute; `DegenerateSegment` when
/// it should but its geometry cannot be cut.
pub fn clip_segment(segment: &RoadSegment, requested: KmRange) -> Result<Option<ClippedPiece>> {
    let Some(window) = clip_window(segment, requested) else {
        return Ok(None);
    };

    let line = cut_line(&segment.geometry.geometry, window.start_fraction, window.end_fraction)
        .map_err(|e| RoadspanError::DegenerateSegment {
            segment_id: segment.id.0,
            reason: e.to_string(),
        })?;

    Ok(Some(ClippedPiece {
        segment_id: segment.id,
        km_range: window.km_range,
        line,
        srid: segment.geometry.srid,
    }))
}

/// Clip every candidate; segments that cannot be clipped are logged and
/// left out
pub fn clip_all(segments: &[RoadSegment], requested: KmRange) -> Vec<ClippedPiece> {
    segments
        .iter()
        .filter_map(|segment| match clip_segment(segment, requested) {
            Ok(piece) => piece,
            Err(e) => {
                tracing::warn!(
                    segment_id = segment.id.0,
                    road_code = %segment.road_code,
                    error = %e,
                    "Skipping segment that could not be clipped"
                );
                None
            }
        })
        .collect()
}
