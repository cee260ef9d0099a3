//! Canonical geometry types used across all roadspan crates.
//!
//! These types mirror the GeoJSON geometry objects the reference stores emit
//! (`ST_AsGeoJSON`) and the API returns. Computational work happens on `geo`
//! crate types in `roadspan-geo`.

use serde::{Deserialize, Serialize};

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::new(3857, "Web Mercator")
    }

    /// Best-effort CRS for a bare EPSG code
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            3857 => Self::web_mercator(),
            other => Self::new(other, format!("EPSG:{}", other)),
        }
    }
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    LineString,
    MultiLineString,
}

/// GeoJSON-compatible geometry representation
///
/// Work locations are either points or (multi-part) lines, so only those
/// GeoJSON types are modelled. Coordinates are `[x, y]`, which for EPSG:4326
/// means `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    MultiLineString { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: [x, y] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a MultiLineString geometry
    pub fn multi_line_string(lines: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::MultiLineString { coordinates: lines }
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::MultiLineString { .. } => GeometryType::MultiLineString,
        }
    }

    /// Iterate over every coordinate of the geometry
    pub fn coords(&self) -> Box<dyn Iterator<Item = &[f64; 2]> + '_> {
        match self {
            Geometry::Point { coordinates } => Box::new(std::iter::once(coordinates)),
            Geometry::LineString { coordinates } => Box::new(coordinates.iter()),
            Geometry::MultiLineString { coordinates } => {
                Box::new(coordinates.iter().flat_map(|line| line.iter()))
            }
        }
    }

    /// True when the geometry holds no coordinates at all
    pub fn is_empty(&self) -> bool {
        self.coords().next().is_none()
    }

    /// Apply a fallible transformation to every coordinate
    pub fn try_map_coords<E>(
        &self,
        mut f: impl FnMut([f64; 2]) -> Result<[f64; 2], E>,
    ) -> Result<Self, E> {
        let mut map_line = |line: &[[f64; 2]]| -> Result<Vec<[f64; 2]>, E> {
            line.iter().map(|c| f(*c)).collect()
        };
        Ok(match self {
            Geometry::Point { coordinates } => {
                let mapped = map_line(std::slice::from_ref(coordinates))?;
                Geometry::Point { coordinates: mapped[0] }
            }
            Geometry::LineString { coordinates } => {
                Geometry::LineString { coordinates: map_line(coordinates)? }
            }
            Geometry::MultiLineString { coordinates } => Geometry::MultiLineString {
                coordinates: coordinates
                    .iter()
                    .map(|line| map_line(line))
                    .collect::<Result<_, E>>()?,
            },
        })
    }

    /// Try to parse from a serde_json::Value (GeoJSON)
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Convert to serde_json::Value (GeoJSON)
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A geometry as stored in a reference table, together with the SRID it is
/// tagged with. The tag is not trusted; see `roadspan_geo::transform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceGeometry {
    pub geometry: Geometry,
    #[serde(default = "default_srid")]
    pub srid: u32,
}

fn default_srid() -> u32 {
    4326
}

impl SourceGeometry {
    pub fn new(geometry: Geometry, srid: u32) -> Self {
        Self { geometry, srid }
    }

    /// Geometry tagged as WGS 84
    pub fn wgs84(geometry: Geometry) -> Self {
        Self::new(geometry, 4326)
    }
}
