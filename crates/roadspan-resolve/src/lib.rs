//! Roadspan Resolve - Work-location geometry resolution
//!
//! Turns a work-location request (a highway plus a kilometer range, or a
//! fixed coordinate) into a geometry:
//!
//! 1. [`resolver`] finds the highway record the request refers to.
//! 2. [`selector`] fetches the surveyed segments overlapping the range.
//! 3. [`clipper`] cuts each segment down to the requested kilometers.
//! 4. [`compositor`] unions the pieces and normalizes them to the target CRS.
//! 5. [`fallback`] degrades to coarser geometry when no piece survives.
//!
//! [`orchestrator::Resolver`] drives the steps per request.

pub mod clipper;
pub mod compositor;
pub mod fallback;
pub mod locate;
pub mod orchestrator;
pub mod resolver;
pub mod selector;
pub mod validation;

pub use locate::KmPosition;
pub use orchestrator::Resolver;
pub use validation::{Coverage, KmGap, KmValidation};
