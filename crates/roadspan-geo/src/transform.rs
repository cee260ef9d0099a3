//! CRS transformation and normalization

use crate::models::{Crs, Geometry, SourceGeometry};
use proj::Proj;
use roadspan_core::config::ResolverSettings;
use roadspan_core::error::{Result, RoadspanError};

const WGS84: u32 = 4326;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// True when every coordinate lies within longitude/latitude bounds
pub fn is_geographic(geometry: &Geometry) -> bool {
    geometry
        .coords()
        .all(|[x, y]| (-180.0..=180.0).contains(x) && (-90.0..=90.0).contains(y))
}

/// Reproject a geometry from one CRS to another
pub fn reproject_geometry(geometry: &Geometry, from_crs: &Crs, to_crs: &Crs) -> Result<Geometry> {
    // If CRS are the same, no transformation needed
    if crs_match(from_crs, to_crs) {
        return Ok(geometry.clone());
    }

    let from_proj = format!("EPSG:{}", from_crs.epsg);
    let to_proj = format!("EPSG:{}", to_crs.epsg);

    let proj = Proj::new_known_crs(&from_proj, &to_proj, None).map_err(|e| {
        RoadspanError::geometry(
            "reproject",
            format!("Failed to create projection from {} to {}: {}", from_proj, to_proj, e),
        )
    })?;

    geometry.try_map_coords(|[x, y]| {
        let (px, py) = proj.convert((x, y)).map_err(|e| {
            RoadspanError::geometry("reproject", format!("Projection failed: {}", e))
        })?;
        if px.is_finite() && py.is_finite() {
            Ok([px, py])
        } else {
            Err(RoadspanError::geometry(
                "reproject",
                format!("Projection of ({}, {}) produced non-finite output", x, y),
            ))
        }
    })
}

/// How stored geometries are brought into the output CRS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrsNormalizer {
    pub target_srid: u32,
    /// SRID assumed for geometries tagged 4326 (or untagged) whose
    /// coordinates are not geographic
    pub assumed_source_srid: u32,
}

impl Default for CrsNormalizer {
    fn default() -> Self {
        Self { target_srid: WGS84, assumed_source_srid: 3857 }
    }
}

impl From<&ResolverSettings> for CrsNormalizer {
    fn from(settings: &ResolverSettings) -> Self {
        Self {
            target_srid: settings.target_srid,
            assumed_source_srid: settings.assumed_source_srid,
        }
    }
}

impl CrsNormalizer {
    /// The SRID a stored geometry is actually in. Source tags are not trusted:
    /// a geographic (or missing) tag on projected-looking coordinates means
    /// the geometry was loaded with the wrong SRID.
    pub fn effective_srid(&self, source: &SourceGeometry) -> u32 {
        match source.srid {
            0 | WGS84 if !is_geographic(&source.geometry) => {
                tracing::debug!(
                    tagged = source.srid,
                    assumed = self.assumed_source_srid,
                    "Geometry coordinates are not geographic, treating SRID tag as wrong"
                );
                self.assumed_source_srid
            }
            0 => WGS84,
            srid => srid,
        }
    }

    /// Reproject a stored geometry into the target CRS
    pub fn normalize(&self, source: &SourceGeometry) -> Result<Geometry> {
        let from = Crs::from_epsg(self.effective_srid(source));
        let to = Crs::from_epsg(self.target_srid);
        let normalized = reproject_geometry(&source.geometry, &from, &to)?;

        if to.epsg == WGS84 && !is_geographic(&normalized) {
            return Err(RoadspanError::geometry(
                "normalize",
                format!("geometry from EPSG:{} is outside geographic bounds after reprojection", from.epsg),
            ));
        }
        Ok(normalized)
    }
}
