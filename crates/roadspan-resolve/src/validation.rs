//! Kilometer range validation against reference data

use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{HighwayReference, KmRange, RoadSegment};
use serde::{Deserialize, Serialize};

/// An uncovered stretch of a requested range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KmGap {
    pub start: f64,
    pub end: f64,
}

/// What a validation result was checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Surveyed segments
    Segments,
    /// The highway's registered km range
    HighwayRange,
    /// Nothing to check against
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmValidation {
    pub valid: bool,
    pub requested: KmRange,
    pub coverage: Coverage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<KmGap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl KmValidation {
    fn checked(requested: KmRange, coverage: Coverage, gaps: Vec<KmGap>) -> Self {
        Self { valid: gaps.is_empty(), requested, coverage, gaps, warning: None }
    }
}

/// Check that a km range is covered by a highway's reference data.
///
/// With segments, every km of the range must fall inside some segment. A
/// highway without segments is checked against its registered range. With
/// neither, the range is accepted with a warning.
pub fn validate_km_range(
    highway: &HighwayReference,
    segments: &[RoadSegment],
    range: KmRange,
) -> Result<KmValidation> {
    if !range.is_finite() {
        return Err(RoadspanError::InvalidRequest {
            reason: format!("{} is not finite", range),
        });
    }
    if range.is_reversed() {
        return Err(RoadspanError::InvalidRequest {
            reason: format!("start km {} is greater than end km {}", range.start, range.end),
        });
    }

    if !segments.is_empty() {
        return Ok(KmValidation::checked(range, Coverage::Segments, segment_gaps(segments, range)));
    }

    if let Some(registered) = highway.km_range {
        let mut gaps = Vec::new();
        if range.start < registered.start {
            gaps.push(KmGap { start: range.start, end: range.end.min(registered.start) });
        }
        if range.end > registered.end {
            gaps.push(KmGap { start: range.start.max(registered.end), end: range.end });
        }
        return Ok(KmValidation::checked(range, Coverage::HighwayRange, gaps));
    }

    Ok(KmValidation {
        valid: true,
        requested: range,
        coverage: Coverage::NoData,
        gaps: Vec::new(),
        warning: Some(format!("no km data registered for {}", highway.label())),
    })
}

fn segment_gaps(segments: &[RoadSegment], range: KmRange) -> Vec<KmGap> {
    let mut ordered: Vec<KmRange> = segments.iter().map(|s| s.km_range()).collect();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    // a single km must lie inside some segment
    if range.length() == 0.0 {
        return if ordered.iter().any(|r| r.contains(range.start)) {
            Vec::new()
        } else {
            vec![KmGap { start: range.start, end: range.end }]
        };
    }

    let mut gaps = Vec::new();
    let mut cursor = range.start;
    for covered in ordered {
        if covered.end <= cursor {
            continue;
        }
        if covered.start >= range.end {
            break;
        }
        if covered.start > cursor {
            gaps.push(KmGap { start: cursor, end: covered.start });
        }
        cursor = covered.end;
        if cursor >= range.end {
            break;
        }
    }
    if cursor < range.end {
        gaps.push(KmGap { start: cursor, end: range.end });
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadspan_core::models::{Geometry, HighwayId, RoadClass, SegmentId, SourceGeometry};

    fn highway(km_range: Option<KmRange>) -> HighwayReference {
        HighwayReference {
            id: HighwayId(3),
            region_code: "SP".to_string(),
            road_code: "SP-055".to_string(),
            name: "SP-055".to_string(),
            class: RoadClass::State,
            km_range,
            geometry: None,
        }
    }

    fn segments(ranges: &[(f64, f64)]) -> Vec<RoadSegment> {
        ranges
            .iter()
            .enumerate()
            .map(|(i, (start, end))| RoadSegment {
                id: SegmentId(i as u64),
                region_code: "SP".to_string(),
                road_code: "SP-055".to_string(),
                km_start: *start,
                km_end: *end,
                geometry: SourceGeometry::wgs84(Geometry::line_string(vec![[0.0, 0.0], [1.0, 0.0]])),
            })
            .collect()
    }

    #[test]
    fn test_rejects_reversed_and_non_finite() {
        let hw = highway(None);
        assert!(validate_km_range(&hw, &[], KmRange::new(10.0, 5.0)).is_err());
        assert!(validate_km_range(&hw, &[], KmRange::new(f64::NAN, 5.0)).is_err());
    }

    #[test]
    fn test_fully_covered_by_segments() {
        let result = validate_km_range(
            &highway(None),
            &segments(&[(20.0, 40.0), (0.0, 20.0)]),
            KmRange::new(5.0, 35.0),
        )
        .unwrap();
        assert!(result.valid);
        assert_eq!(result.coverage, Coverage::Segments);
    }

    #[test]
    fn test_gaps_are_reported() {
        let result = validate_km_range(
            &highway(Some(KmRange::new(0.0, 100.0))),
            &segments(&[(0.0, 10.0), (15.0, 30.0), (25.0, 40.0)]),
            KmRange::new(5.0, 50.0),
        )
        .unwrap();
        assert!(!result.valid);
        assert_eq!(
            result.gaps,
            vec![KmGap { start: 10.0, end: 15.0 }, KmGap { start: 40.0, end: 50.0 }]
        );
    }

    #[test]
    fn test_single_km() {
        let segs = segments(&[(0.0, 10.0)]);
        assert!(validate_km_range(&highway(None), &segs, KmRange::new(10.0, 10.0)).unwrap().valid);
        assert!(!validate_km_range(&highway(None), &segs, KmRange::new(11.0, 11.0)).unwrap().valid);
    }

    #[test]
    fn test_registered_range_without_segments() {
        let hw = highway(Some(KmRange::new(0.0, 100.0)));
        assert!(validate_km_range(&hw, &[], KmRange::new(10.0, 90.0)).unwrap().valid);

        let outside = validate_km_range(&hw, &[], KmRange::new(90.0, 120.0)).unwrap();
        assert!(!outside.valid);
        assert_eq!(outside.coverage, Coverage::HighwayRange);
        assert_eq!(outside.gaps, vec![KmGap { start: 100.0, end: 120.0 }]);
    }

    #[test]
    fn test_no_data_is_valid_with_warning() {
        let result = validate_km_range(&highway(None), &[], KmRange::new(10.0, 20.0)).unwrap();
        assert!(result.valid);
        assert_eq!(result.coverage, Coverage::NoData);
        assert!(result.warning.is_some());
    }
}
