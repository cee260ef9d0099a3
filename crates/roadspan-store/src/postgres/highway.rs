use async_trait::async_trait;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{
    HighwayId, HighwayLookup, HighwayReference, KmRange, RoadClass,
};
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{decode_geometry, store_error, PostgresStore};
use crate::ports::HighwayStore;

const HIGHWAY_COLUMNS: &str = "id, region_code, road_code, name, class, km_start, km_end, \
     ST_AsGeoJSON(ST_Force2D(geom)) AS geojson, ST_SRID(geom) AS srid";

fn parse_class(raw: &str) -> Result<RoadClass> {
    match raw.trim().to_uppercase().as_str() {
        "FEDERAL" => Ok(RoadClass::Federal),
        "STATE" => Ok(RoadClass::State),
        other => Err(RoadspanError::Store(format!("Unknown road class '{}'", other))),
    }
}

fn highway_from_row(row: &PgRow) -> Result<HighwayReference> {
    let id: i64 = row.try_get("id").map_err(|e| store_error("Invalid highway id", e))?;
    let class: String = row.try_get("class").map_err(|e| store_error("Invalid road class", e))?;
    let km_start: Option<f64> = row.try_get("km_start").map_err(|e| store_error("Invalid km_start", e))?;
    let km_end: Option<f64> = row.try_get("km_end").map_err(|e| store_error("Invalid km_end", e))?;

    Ok(HighwayReference {
        id: HighwayId(id as u64),
        region_code: row.try_get("region_code").map_err(|e| store_error("Invalid region_code", e))?,
        road_code: row.try_get("road_code").map_err(|e| store_error("Invalid road_code", e))?,
        name: row.try_get("name").map_err(|e| store_error("Invalid name", e))?,
        class: parse_class(&class)?,
        km_range: km_start.zip(km_end).map(|(start, end)| KmRange::new(start, end)),
        geometry: decode_geometry(
            row.try_get("geojson").map_err(|e| store_error("Invalid geometry", e))?,
            row.try_get("srid").map_err(|e| store_error("Invalid srid", e))?,
        ),
    })
}

#[async_trait]
impl HighwayStore for PostgresStore {
    async fn find_highway(&self, lookup: &HighwayLookup) -> Result<Option<HighwayReference>> {
        let table = &self.config.tables.highways;

        let row = match lookup {
            HighwayLookup::ById(id) => {
                let sql = format!("SELECT {} FROM {} WHERE id = $1", HIGHWAY_COLUMNS, table);
                sqlx::query(&sql)
                    .bind(id.0 as i64)
                    .fetch_optional(&self.pool)
                    .await
            }
            HighwayLookup::ByCode { region_code, class, road_code } => {
                let sql = format!(
                    "SELECT {} FROM {} \
                     WHERE UPPER(region_code) = UPPER($1) AND UPPER(class) = $2 AND road_code = $3 \
                     ORDER BY id LIMIT 1",
                    HIGHWAY_COLUMNS, table
                );
                sqlx::query(&sql)
                    .bind(region_code)
                    .bind(class.as_str())
                    .bind(road_code)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .map_err(|e| store_error("Failed to look up highway", e))?;

        row.as_ref().map(highway_from_row).transpose()
    }

    async fn sample_highways(
        &self,
        region_code: &str,
        class: RoadClass,
        limit: usize,
    ) -> Result<Vec<HighwayReference>> {
        let sql = format!(
            "SELECT {} FROM {} \
             WHERE UPPER(region_code) = UPPER($1) AND UPPER(class) = $2 \
             ORDER BY road_code, id LIMIT $3",
            HIGHWAY_COLUMNS, self.config.tables.highways
        );

        let rows = sqlx::query(&sql)
            .bind(region_code)
            .bind(class.as_str())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to sample highways", e))?;

        rows.iter().map(highway_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class() {
        assert_eq!(parse_class("FEDERAL").unwrap(), RoadClass::Federal);
        assert_eq!(parse_class(" state ").unwrap(), RoadClass::State);
        assert!(parse_class("MUNICIPAL").is_err());
    }
}
