//! Conversions between kilometers and coordinates on a resolved geometry

use geo::{LineString, Point};
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{Geometry, KmRange};
use roadspan_geo::linear::{interpolate_at_fraction, locate_point, merge_lines};
use roadspan_geo::models::lines_of;
use serde::{Deserialize, Serialize};

/// A kilometer mark and the coordinate it corresponds to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KmPosition {
    pub km: f64,
    pub longitude: f64,
    pub latitude: f64,
}

fn merged(geometry: &Geometry) -> Result<LineString> {
    merge_lines(&lines_of(geometry)?)
}

/// Coordinate at `km` along a geometry spanning `range`
pub fn point_at_km(geometry: &Geometry, range: KmRange, km: f64) -> Result<KmPosition> {
    if !km.is_finite() || !range.contains(km) {
        return Err(RoadspanError::KmOutOfRange { km, start: range.start, end: range.end });
    }

    let length = range.length();
    let fraction = if length > 0.0 { (km - range.start) / length } else { 0.0 };
    let coord = interpolate_at_fraction(&merged(geometry)?, fraction)?;

    Ok(KmPosition { km, longitude: coord.x, latitude: coord.y })
}

/// Kilometer mark of the point on a geometry closest to a coordinate
pub fn locate_km(geometry: &Geometry, range: KmRange, latitude: f64, longitude: f64) -> Result<KmPosition> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(RoadspanError::InvalidRequest {
            reason: "coordinates must be finite".to_string(),
        });
    }

    let located = locate_point(&merged(geometry)?, Point::new(longitude, latitude))?;
    Ok(KmPosition {
        km: range.start + located.fraction * range.length(),
        longitude: located.snapped.x,
        latitude: located.snapped.y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn road() -> Geometry {
        Geometry::multi_line_string(vec![
            vec![[-47.0, -23.0], [-46.5, -23.0]],
            vec![[-46.5, -23.0], [-46.0, -23.0]],
        ])
    }

    #[test]
    fn test_point_at_km() {
        let position = point_at_km(&road(), KmRange::new(100.0, 200.0), 150.0).unwrap();
        assert!((position.longitude - -46.5).abs() < 1e-9);
        assert!((position.latitude - -23.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_at_km_out_of_range() {
        let result = point_at_km(&road(), KmRange::new(100.0, 200.0), 250.0);
        assert!(matches!(result, Err(RoadspanError::KmOutOfRange { .. })));
    }

    #[test]
    fn test_point_at_km_zero_length_range() {
        let position = point_at_km(&road(), KmRange::new(100.0, 100.0), 100.0).unwrap();
        assert_eq!((position.longitude, position.latitude), (-47.0, -23.0));
    }

    #[test]
    fn test_locate_km_snaps() {
        let position = locate_km(&road(), KmRange::new(100.0, 200.0), -22.9, -46.25).unwrap();
        assert!((position.km - 175.0).abs() < 1e-6);
        assert!((position.latitude - -23.0).abs() < 1e-9);
        assert!((position.longitude - -46.25).abs() < 1e-9);
    }

    #[test]
    fn test_points_have_no_km() {
        let result = point_at_km(&Geometry::point(0.0, 0.0), KmRange::new(0.0, 1.0), 0.5);
        assert!(result.is_err());
    }
}
