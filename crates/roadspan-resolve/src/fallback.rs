//! Fallback ladder for requests without usable segments
//!
//! Tiers are tried from most to least precise; the first one that yields a
//! geometry wins. A tier that cannot produce anything is logged and skipped.

use roadspan_core::config::ResolverSettings;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{HighwayReference, KmRange, ResolvedGeometry, SourceGeometry, Tier};
use roadspan_geo::models::from_geo_line;
use roadspan_geo::transform::CrsNormalizer;

use crate::clipper::cut_line;

/// A tier attempt
pub type TierFn<'a, T> = &'a dyn Fn() -> Option<T>;

/// Run tiers in order and return the first result
pub fn first_success<T>(tiers: &[TierFn<'_, T>]) -> Option<T> {
    tiers.iter().find_map(|tier| tier())
}

/// Coarser geometry for one highway and requested range
pub struct FallbackLadder<'a> {
    highway: &'a HighwayReference,
    requested: KmRange,
    settings: &'a ResolverSettings,
    normalizer: CrsNormalizer,
}

impl<'a> FallbackLadder<'a> {
    pub fn new(
        highway: &'a HighwayReference,
        requested: KmRange,
        settings: &'a ResolverSettings,
    ) -> Self {
        Self { highway, requested, settings, normalizer: CrsNormalizer::from(settings) }
    }

    /// First tier that produces a geometry, or `None` when even the full
    /// highway geometry is unavailable
    pub fn resolve(&self) -> Option<ResolvedGeometry> {
        let approximate = || self.attempt(Tier::Approximate, self.approximate());
        let full = || self.attempt(Tier::Full, self.full());
        let tiers: [TierFn<'_, ResolvedGeometry>; 2] = [&approximate, &full];
        first_success(&tiers)
    }

    fn attempt(&self, tier: Tier, result: Result<ResolvedGeometry>) -> Option<ResolvedGeometry> {
        match result {
            Ok(resolved) => {
                tracing::info!(road_code = %self.highway.road_code, %tier, "Fallback tier succeeded");
                Some(resolved)
            }
            Err(e) => {
                tracing::debug!(road_code = %self.highway.road_code, %tier, error = %e, "Fallback tier failed");
                None
            }
        }
    }

    fn source_geometry(&self) -> Result<&'a SourceGeometry> {
        self.highway
            .geometry
            .as_ref()
            .ok_or_else(|| RoadspanError::NoGeometryAvailable { road: self.highway.label() })
    }

    /// Cut the whole highway as if it were `nominal length` km long
    pub fn approximate(&self) -> Result<ResolvedGeometry> {
        let nominal = self.settings.nominal_length_for(self.highway.class).ok_or_else(|| {
            RoadspanError::geometry(
                "approximate",
                format!("no nominal length configured for {} roads", self.highway.class),
            )
        })?;
        let source = self.source_geometry()?;

        let start_fraction = (self.requested.start / nominal).clamp(0.0, 1.0);
        let end_fraction = (self.requested.end / nominal).clamp(0.0, 1.0);
        if start_fraction >= end_fraction {
            return Err(RoadspanError::geometry(
                "approximate",
                format!("{} collapses to a single point on a {} km road", self.requested, nominal),
            ));
        }

        let line = cut_line(&source.geometry, start_fraction, end_fraction)?;
        let cut = SourceGeometry::new(from_geo_line(&line), source.srid);
        Ok(ResolvedGeometry::new(self.normalizer.normalize(&cut)?, Tier::Approximate))
    }

    /// The highway's entire geometry, unclipped
    pub fn full(&self) -> Result<ResolvedGeometry> {
        let source = self.source_geometry()?;
        Ok(ResolvedGeometry::new(self.normalizer.normalize(source)?, Tier::Full))
    }
}
