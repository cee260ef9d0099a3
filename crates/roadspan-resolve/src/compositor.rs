//! Geometry compositor

use geo::LineString;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{
    CompositeAttributes, Geometry, HighwayReference, KmRange, ResolvedGeometry, SourceGeometry,
    Tier,
};
use roadspan_geo::compose::union_lines;
use roadspan_geo::models::{from_geo_line, lines_of};
use roadspan_geo::transform::CrsNormalizer;

use crate::clipper::ClippedPiece;

/// Bring one clipped piece into the target CRS
fn normalize_piece(piece: &ClippedPiece, normalizer: &CrsNormalizer) -> Result<Vec<LineString>> {
    let source = SourceGeometry::new(from_geo_line(&piece.line), piece.srid);
    lines_of(&normalizer.normalize(&source)?)
}

/// Combine clipped pieces into the exact-tier geometry.
///
/// Pieces are ordered along the road by km. Every piece is normalized on its
/// own since segments may carry different SRIDs. A piece that fails to
/// normalize is dropped; if none survive the composition fails.
pub fn compose(
    pieces: &[ClippedPiece],
    highway: &HighwayReference,
    requested: KmRange,
    normalizer: &CrsNormalizer,
) -> Result<ResolvedGeometry> {
    let mut ordered: Vec<&ClippedPiece> = pieces.iter().collect();
    ordered.sort_by(|a, b| {
        a.km_range.start.total_cmp(&b.km_range.start).then(a.segment_id.cmp(&b.segment_id))
    });

    let mut lines = Vec::with_capacity(ordered.len());
    for piece in ordered {
        match normalize_piece(piece, normalizer) {
            Ok(normalized) => lines.extend(normalized),
            Err(e) => tracing::warn!(
                segment_id = piece.segment_id.0,
                error = %e,
                "Dropping clipped piece that could not be normalized"
            ),
        }
    }

    if lines.is_empty() {
        return Err(RoadspanError::NoGeometryAvailable { road: highway.label() });
    }

    let geometry = union_lines(&lines)?;
    let resolved = ResolvedGeometry::new(geometry, Tier::Exact);

    match &resolved.geometry {
        Geometry::MultiLineString { coordinates } => {
            let attributes = CompositeAttributes {
                region_code: highway.region_code.clone(),
                road_code: highway.road_code.clone(),
                km_start: requested.start,
                km_end: requested.end,
                pieces: coordinates.len(),
            };
            Ok(resolved.with_attributes(attributes))
        }
        _ => Ok(resolved),
    }
}
