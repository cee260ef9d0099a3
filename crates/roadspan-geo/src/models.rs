//! Geometry models for roadspan-geo.
//!
//! This module re-exports canonical types from `roadspan-core` and provides
//! conversions to and from the `geo` crate, where the actual computation
//! happens.

use geo::{Coord, Geometry as GeoGeometry, LineString, MultiLineString, Point};
use roadspan_core::error::{Result, RoadspanError};

// Re-export canonical types from roadspan-core
pub use roadspan_core::models::{Crs, Geometry, GeometryType, SourceGeometry};

fn to_line(coords: &[[f64; 2]]) -> LineString {
    LineString::new(coords.iter().map(|c| Coord { x: c[0], y: c[1] }).collect())
}

fn from_line(line: &LineString) -> Vec<[f64; 2]> {
    line.coords().map(|c| [c.x, c.y]).collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(to_line(coordinates)),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            MultiLineString::new(coordinates.iter().map(|line| to_line(line)).collect()),
        ),
    }
}

/// Convert a geo::Geometry to a canonical Geometry
///
/// Only the geometry kinds a work location can have are supported.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Result<Geometry> {
    match geom {
        GeoGeometry::Point(p) => Ok(Geometry::point(p.x(), p.y())),
        GeoGeometry::Line(l) => {
            Ok(Geometry::line_string(vec![[l.start.x, l.start.y], [l.end.x, l.end.y]]))
        }
        GeoGeometry::LineString(ls) => Ok(Geometry::line_string(from_line(ls))),
        GeoGeometry::MultiLineString(mls) => {
            Ok(Geometry::multi_line_string(mls.iter().map(from_line).collect()))
        }
        other => Err(RoadspanError::geometry(
            "from_geo_geometry",
            format!("unsupported geometry kind {:?}", geo_kind(other)),
        )),
    }
}

fn geo_kind(geom: &GeoGeometry) -> &'static str {
    match geom {
        GeoGeometry::Point(_) => "Point",
        GeoGeometry::Line(_) => "Line",
        GeoGeometry::LineString(_) => "LineString",
        GeoGeometry::Polygon(_) => "Polygon",
        GeoGeometry::MultiPoint(_) => "MultiPoint",
        GeoGeometry::MultiLineString(_) => "MultiLineString",
        GeoGeometry::MultiPolygon(_) => "MultiPolygon",
        GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        GeoGeometry::Rect(_) => "Rect",
        GeoGeometry::Triangle(_) => "Triangle",
    }
}

/// Convert a geo::LineString into a canonical LineString geometry
pub fn from_geo_line(line: &LineString) -> Geometry {
    Geometry::line_string(from_line(line))
}

/// The line parts of a linear geometry, skipping empty parts
pub fn lines_of(geom: &Geometry) -> Result<Vec<LineString>> {
    match geom {
        Geometry::LineString { coordinates } => {
            Ok(std::iter::once(coordinates).filter(|c| !c.is_empty()).map(|c| to_line(c)).collect())
        }
        Geometry::MultiLineString { coordinates } => {
            Ok(coordinates.iter().filter(|c| !c.is_empty()).map(|c| to_line(c)).collect())
        }
        Geometry::Point { .. } => {
            Err(RoadspanError::geometry("lines_of", "expected a linear geometry, got a Point"))
        }
    }
}

/// Render a canonical geometry as a `geojson` geometry object
pub fn to_geojson_geometry(geom: &Geometry) -> geojson::Geometry {
    let value = geojson::Value::from(&to_geo_geometry(geom));
    geojson::Geometry::new(value)
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Line parts of the geometry
    fn lines(&self) -> Result<Vec<LineString>>;

    /// Render as a `geojson` geometry object
    fn to_geojson_geometry(&self) -> geojson::Geometry;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn lines(&self) -> Result<Vec<LineString>> {
        lines_of(self)
    }

    fn to_geojson_geometry(&self) -> geojson::Geometry {
        to_geojson_geometry(self)
    }
}
