//! Roadspan Store - Highway reference data access
//!
//! The resolution engine reads highways and surveyed road segments through
//! the ports in [`ports`]. In-memory adapters back tests, the CLI and the
//! default API configuration; the PostgreSQL adapter reads a PostGIS
//! reference database.

pub mod memory;
pub mod ports;
pub mod postgres;
pub mod reference;

pub use memory::{MemoryHighwayStore, MemorySegmentStore};
pub use ports::{HighwayStore, SegmentStore};
pub use reference::ReferenceData;
