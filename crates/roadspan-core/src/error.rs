//! Error types for Roadspan

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoadspanError {
    // Identification errors
    #[error("Highway not found: {lookup}")]
    HighwayNotFound { lookup: String },

    #[error("Invalid work location request: {reason}")]
    InvalidRequest { reason: String },

    // Geometry errors
    #[error("Degenerate segment {segment_id}: {reason}")]
    DegenerateSegment { segment_id: u64, reason: String },

    #[error("Geometry computation failed in {operation}: {reason}")]
    GeometryComputation {
        operation: &'static str,
        reason: String,
    },

    #[error("No geometry available for {road}")]
    NoGeometryAvailable { road: String },

    #[error("KM {km} is outside the range {start} - {end}")]
    KmOutOfRange { km: f64, start: f64, end: f64 },

    // Store errors
    #[error("Reference store error: {0}")]
    Store(String),

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Reference data file not found at {path}")]
    ReferenceDataNotFound { path: PathBuf },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RoadspanError {
    /// Shorthand for a failed geometry operation
    pub fn geometry(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::GeometryComputation { operation, reason: reason.into() }
    }

    /// Whether this error only means "try the next tier"
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DegenerateSegment { .. }
                | Self::GeometryComputation { .. }
                | Self::NoGeometryAvailable { .. }
        )
    }
}

impl From<serde_json::Error> for RoadspanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RoadspanError>;
