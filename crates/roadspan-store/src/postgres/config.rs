//! PostgreSQL configuration

use std::time::Duration;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { key: key.to_string(), reason: reason.into() }
}

/// Read an optional numeric environment variable
fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, format!("'{}' is not a number", raw))),
        Err(_) => Ok(None),
    }
}

/// PostgreSQL connection and reference schema configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub pool: PoolConfig,
    pub tables: TableConfig,
}

impl PostgresConfig {
    /// Load configuration from environment variables.
    ///
    /// | variable | meaning |
    /// |---|---|
    /// | `DATABASE_URL` | connection URL (required) |
    /// | `ROADSPAN_HIGHWAYS_TABLE`, `ROADSPAN_SEGMENTS_TABLE` | table names |
    /// | `ROADSPAN_DB_MAX_CONNECTIONS` | pool size |
    /// | `ROADSPAN_DB_ACQUIRE_TIMEOUT_SECS` | wait for a free connection |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?;
        let mut config = Self::new(database_url)?;

        if let Ok(table) = std::env::var("ROADSPAN_HIGHWAYS_TABLE") {
            config.tables.highways = table;
        }
        if let Ok(table) = std::env::var("ROADSPAN_SEGMENTS_TABLE") {
            config.tables.segments = table;
        }
        if let Some(max) = env_number("ROADSPAN_DB_MAX_CONNECTIONS")? {
            config.pool.max_connections = max;
        }
        if let Some(secs) = env_number("ROADSPAN_DB_ACQUIRE_TIMEOUT_SECS")? {
            config.pool.acquire_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn new(database_url: String) -> Result<Self, ConfigError> {
        let config = Self {
            database_url,
            pool: PoolConfig::default(),
            tables: TableConfig::default(),
        };
        config.validate_url()?;
        Ok(config)
    }

    fn validate_url(&self) -> Result<(), ConfigError> {
        let url = self.database_url.trim();
        if url.is_empty() {
            return Err(invalid("database_url", "cannot be empty"));
        }
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(invalid("database_url", "must start with postgres:// or postgresql://"));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_url()?;
        self.pool.validate()?;
        self.tables.validate()
    }
}

/// Connection pool sizing. The store only reads, so a small pool suffices.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(invalid("pool.max_connections", "must be at least 1"));
        }
        if self.min_connections > self.max_connections {
            return Err(invalid(
                "pool.min_connections",
                format!("{} exceeds max_connections {}", self.min_connections, self.max_connections),
            ));
        }
        if self.acquire_timeout.is_zero() {
            return Err(invalid("pool.acquire_timeout", "must be positive"));
        }
        Ok(())
    }
}

/// Names of the reference tables.
///
/// Table names are interpolated into SQL, so they must be plain identifiers,
/// optionally schema-qualified (`reference.highways`).
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub highways: String,
    pub segments: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            highways: "highways".to_string(),
            segments: "road_segments".to_string(),
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, name) in [("tables.highways", &self.highways), ("tables.segments", &self.segments)]
        {
            if !is_qualified_identifier(name) {
                return Err(invalid(key, format!("'{}' is not a valid table name", name)));
            }
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_qualified_identifier(s: &str) -> bool {
    match s.split_once('.') {
        Some((schema, table)) => is_identifier(schema) && is_identifier(table),
        None => is_identifier(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_valid() {
        let config = PostgresConfig::new("postgresql://localhost/roads".to_string()).unwrap();
        assert_eq!(config.tables.highways, "highways");
        assert_eq!(config.tables.segments, "road_segments");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_new_empty_url() {
        match PostgresConfig::new("  ".to_string()) {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "database_url"),
            other => panic!("Expected Invalid error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_rejects_other_schemes() {
        assert!(PostgresConfig::new("mysql://localhost/roads".to_string()).is_err());
        assert!(PostgresConfig::new("postgres://localhost/roads".to_string()).is_ok());
    }

    #[test]
    fn test_pool_limits() {
        assert!(PoolConfig::default().validate().is_ok());

        let inverted = PoolConfig { min_connections: 20, max_connections: 10, ..Default::default() };
        assert!(inverted.validate().is_err());

        let empty = PoolConfig { max_connections: 0, min_connections: 0, ..Default::default() };
        assert!(empty.validate().is_err());

        let no_wait = PoolConfig { acquire_timeout: Duration::ZERO, ..Default::default() };
        assert!(no_wait.validate().is_err());
    }

    #[test]
    fn test_table_names() {
        let mut tables = TableConfig::default();
        assert!(tables.validate().is_ok());

        tables.highways = "reference.rodovias".to_string();
        assert!(tables.validate().is_ok());

        tables.segments = "segments; DROP TABLE x".to_string();
        assert!(tables.validate().is_err());

        tables.segments = "1segments".to_string();
        assert!(tables.validate().is_err());

        tables.segments = "a.b.c".to_string();
        assert!(tables.validate().is_err());
    }
}
