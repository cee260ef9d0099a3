use roadspan_core::config::{LayeredConfig, ResolverSettings};
use roadspan_core::error::Result;
use std::env;
use std::path::PathBuf;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    pub database_url: Option<String>,
    /// JSON reference data served from memory when no database is configured
    pub reference_file: Option<PathBuf>,
    /// TOML file with resolver settings
    pub config_file: Option<PathBuf>,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("ROADSPAN_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3001);

        let cors_origin =
            env::var("ROADSPAN_CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        let reference_file = env::var("ROADSPAN_REFERENCE_FILE").ok().map(PathBuf::from);
        let config_file = env::var("ROADSPAN_CONFIG").ok().map(PathBuf::from);

        Self {
            port,
            cors_origin,
            database_url,
            reference_file,
            config_file,
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Check if PostgreSQL storage is configured
    pub fn uses_postgres(&self) -> bool {
        self.database_url.is_some()
    }

    /// Resolver settings from defaults, the optional config file and
    /// `ROADSPAN_*` variables
    pub fn resolver_settings(&self) -> Result<ResolverSettings> {
        let mut layered = LayeredConfig::with_defaults();
        if let Some(path) = &self.config_file {
            layered = layered.load_from_file(path)?;
        }
        layered.load_from_env().settings()
    }
}
