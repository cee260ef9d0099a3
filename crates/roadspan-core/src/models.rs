pub mod geometry;
pub mod highway;
pub mod request;
pub mod resolution;

pub use geometry::{Crs, Geometry, GeometryType, SourceGeometry};
pub use highway::{
    HighwayId, HighwayLookup, HighwayReference, KmRange, RoadClass, RoadMatcher, RoadSegment,
    SegmentId,
};
pub use request::WorkLocationRequest;
pub use resolution::{
    CompositeAttributes, ResolutionOutcome, ResolutionReport, ResolvedGeometry, SkipReason,
    SkippedItem, Tier,
};
