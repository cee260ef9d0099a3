use async_trait::async_trait;
use roadspan_core::error::Result;
use roadspan_core::models::{KmRange, RoadMatcher, RoadSegment, SegmentId};
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{decode_geometry, store_error, PostgresStore};
use crate::ports::SegmentStore;

const SEGMENT_COLUMNS: &str = "id, region_code, road_code, km_start, km_end, \
     ST_AsGeoJSON(ST_Force2D(geom)) AS geojson, ST_SRID(geom) AS srid";

/// Road matching in SQL: canonical code, display name, or a branch of the
/// display name (`$4` is `NULL` when branch matching is off)
const ROAD_MATCH: &str = "(road_code = $2 OR road_code = $3 \
     OR ($4::text IS NOT NULL AND road_code LIKE $4 ESCAPE '\\'))";

/// Rows whose geometry cannot be used are dropped with a warning
fn segment_from_row(row: &PgRow) -> Result<Option<RoadSegment>> {
    let id: i64 = row.try_get("id").map_err(|e| store_error("Invalid segment id", e))?;
    let road_code: String =
        row.try_get("road_code").map_err(|e| store_error("Invalid road_code", e))?;

    let geometry = decode_geometry(
        row.try_get("geojson").map_err(|e| store_error("Invalid geometry", e))?,
        row.try_get("srid").map_err(|e| store_error("Invalid srid", e))?,
    );
    let Some(geometry) = geometry else {
        tracing::warn!(segment_id = id, road_code = %road_code, "Skipping segment without usable geometry");
        return Ok(None);
    };

    Ok(Some(RoadSegment {
        id: SegmentId(id as u64),
        region_code: row.try_get("region_code").map_err(|e| store_error("Invalid region_code", e))?,
        road_code,
        km_start: row.try_get("km_start").map_err(|e| store_error("Invalid km_start", e))?,
        km_end: row.try_get("km_end").map_err(|e| store_error("Invalid km_end", e))?,
        geometry,
    }))
}

fn collect_segments(rows: &[PgRow]) -> Result<Vec<RoadSegment>> {
    let mut segments = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(segment) = segment_from_row(row)? {
            segments.push(segment);
        }
    }
    Ok(segments)
}

#[async_trait]
impl SegmentStore for PostgresStore {
    async fn find_overlapping_segments(
        &self,
        region_code: &str,
        matcher: &RoadMatcher,
        range: KmRange,
    ) -> Result<Vec<RoadSegment>> {
        let sql = format!(
            "SELECT {} FROM {} \
             WHERE UPPER(region_code) = UPPER($1) AND {} \
             AND km_end >= $5 AND km_start <= $6 AND geom IS NOT NULL \
             ORDER BY km_start, id",
            SEGMENT_COLUMNS, self.config.tables.segments, ROAD_MATCH
        );

        let rows = sqlx::query(&sql)
            .bind(region_code)
            .bind(&matcher.code)
            .bind(&matcher.name)
            .bind(matcher.branch_like_pattern())
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to query road segments", e))?;

        collect_segments(&rows)
    }

    async fn segments_for_road(
        &self,
        region_code: &str,
        matcher: &RoadMatcher,
    ) -> Result<Vec<RoadSegment>> {
        let sql = format!(
            "SELECT {} FROM {} \
             WHERE UPPER(region_code) = UPPER($1) AND {} AND geom IS NOT NULL \
             ORDER BY km_start, id",
            SEGMENT_COLUMNS, self.config.tables.segments, ROAD_MATCH
        );

        let rows = sqlx::query(&sql)
            .bind(region_code)
            .bind(&matcher.code)
            .bind(&matcher.name)
            .bind(matcher.branch_like_pattern())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to query road segments", e))?;

        collect_segments(&rows)
    }
}
