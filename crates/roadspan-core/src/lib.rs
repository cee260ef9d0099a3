//! Roadspan Core - Domain models, errors, and configuration
//!
//! This crate contains the reference-data models (highways and surveyed road
//! segments), the work-location request and outcome types, and the layered
//! configuration consumed by the resolution engine.

pub mod config;
pub mod error;
pub mod models;

pub use error::{Result, RoadspanError};
