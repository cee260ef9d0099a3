//! Roadspan Geo - Linear referencing, composition and CRS normalization
//!
//! This crate holds the geometry toolkit the resolution engine is built on:
//! merging fragmented lines, cutting them at arc-length fractions, unioning
//! clipped pieces and normalizing everything to the target CRS.

pub mod compose;
pub mod linear;
pub mod models;
pub mod transform;
