//! PostgreSQL/PostGIS read adapter
//!
//! Expected schema (column names are fixed, table names configurable):
//!
//! - highways: `id BIGINT, region_code TEXT, road_code TEXT, name TEXT,
//!   class TEXT ('FEDERAL' | 'STATE'), km_start DOUBLE PRECISION NULL,
//!   km_end DOUBLE PRECISION NULL, geom geometry NULL`
//! - road segments: `id BIGINT, region_code TEXT, road_code TEXT,
//!   km_start DOUBLE PRECISION, km_end DOUBLE PRECISION, geom geometry`

pub mod config;
mod highway;
mod segment;

pub use config::{ConfigError, PoolConfig, PostgresConfig, TableConfig};

use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{Geometry, SourceGeometry};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// PostgreSQL storage adapter implementing both reference ports
pub struct PostgresStore {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given configuration
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        config.validate().map_err(|e| RoadspanError::ConfigInvalid {
            key: "postgres".to_string(),
            reason: e.to_string(),
        })?;

        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .idle_timeout(config.pool.idle_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| store_error("Failed to connect to database", e))?;

        let store = Self { pool, config };
        store.health_check().await?;

        tracing::info!(
            highways_table = %store.config.tables.highways,
            segments_table = %store.config.tables.segments,
            "Connected to PostgreSQL reference store"
        );
        Ok(store)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    /// Perform a health check on the database connection
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("Health check failed", e))?;
        Ok(())
    }
}

pub(crate) fn store_error(context: &str, err: sqlx::Error) -> RoadspanError {
    RoadspanError::Store(format!("{}: {}", context, err))
}

/// Decode an `ST_AsGeoJSON` / `ST_SRID` column pair.
///
/// Geometry kinds a work location cannot have decode to `None`.
pub(crate) fn decode_geometry(geojson: Option<String>, srid: Option<i32>) -> Option<SourceGeometry> {
    let raw = geojson?;
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable GeoJSON from reference store");
            return None;
        }
    };
    let geometry = Geometry::from_geojson(&value)?;
    let srid = srid.and_then(|s| u32::try_from(s).ok()).unwrap_or(0);
    Some(SourceGeometry::new(geometry, srid))
}
