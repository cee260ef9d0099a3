//! Resolution results handed back to the contract service.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::Geometry;
use super::highway::KmRange;

/// Precision of a resolved geometry, from segment-accurate to nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// Clipped from surveyed segments (or a fixed point)
    Exact,
    /// Fractional cut of the whole highway assuming a nominal length
    Approximate,
    /// Entire highway geometry, unclipped
    Full,
    /// No geometry could be produced
    None,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Exact => "EXACT",
            Tier::Approximate => "APPROXIMATE",
            Tier::Full => "FULL",
            Tier::None => "NONE",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive attributes carried by a geometry composed of several pieces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAttributes {
    pub region_code: String,
    pub road_code: String,
    pub km_start: f64,
    pub km_end: f64,
    pub pieces: usize,
}

/// A geometry together with the tier that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGeometry {
    pub geometry: Geometry,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<CompositeAttributes>,
}

impl ResolvedGeometry {
    pub fn new(geometry: Geometry, tier: Tier) -> Self {
        Self { geometry, tier, attributes: None }
    }

    pub fn with_attributes(mut self, attributes: CompositeAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

/// Why a work location was not created at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SkipReason {
    /// The highway selector matched no reference record
    HighwayNotFound { lookup: String },
    /// The request itself was malformed
    InvalidRequest { detail: String },
    /// The reference store could not be queried
    LookupFailed { detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HighwayNotFound { lookup } => write!(f, "highway not found: {}", lookup),
            SkipReason::InvalidRequest { detail } => write!(f, "invalid request: {}", detail),
            SkipReason::LookupFailed { detail } => write!(f, "highway lookup failed: {}", detail),
        }
    }
}

/// Per-request result of the resolution engine
///
/// `Created` with `tier: None` still creates the work location (without
/// geometry); `Skipped` means the work location must not be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionOutcome {
    Created {
        geometry: Option<Geometry>,
        tier: Tier,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<CompositeAttributes>,
    },
    Skipped { reason: SkipReason },
}

impl ResolutionOutcome {
    /// Created without geometry
    pub fn unresolved() -> Self {
        ResolutionOutcome::Created { geometry: None, tier: Tier::None, attributes: None }
    }

    pub fn skipped(reason: SkipReason) -> Self {
        ResolutionOutcome::Skipped { reason }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            ResolutionOutcome::Created { tier, .. } => Some(*tier),
            ResolutionOutcome::Skipped { .. } => None,
        }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        match self {
            ResolutionOutcome::Created { geometry, .. } => geometry.as_ref(),
            ResolutionOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ResolutionOutcome::Skipped { .. })
    }
}

impl From<ResolvedGeometry> for ResolutionOutcome {
    fn from(resolved: ResolvedGeometry) -> Self {
        ResolutionOutcome::Created {
            geometry: Some(resolved.geometry),
            tier: resolved.tier,
            attributes: resolved.attributes,
        }
    }
}

impl From<Option<ResolvedGeometry>> for ResolutionOutcome {
    fn from(resolved: Option<ResolvedGeometry>) -> Self {
        resolved.map(Self::from).unwrap_or_else(Self::unresolved)
    }
}

/// A skipped request and its position in the input list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub index: usize,
    pub reason: SkipReason,
}

/// Summary of a batch of outcomes, so callers can tell users which work
/// locations were dropped and how precise the rest are
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub exact: usize,
    pub approximate: usize,
    pub full: usize,
    pub without_geometry: usize,
    pub skipped: Vec<SkippedItem>,
}

impl ResolutionReport {
    pub fn from_outcomes(outcomes: &[ResolutionOutcome]) -> Self {
        let mut report = Self::default();
        for (index, outcome) in outcomes.iter().enumerate() {
            match outcome {
                ResolutionOutcome::Created { tier, .. } => match tier {
                    Tier::Exact => report.exact += 1,
                    Tier::Approximate => report.approximate += 1,
                    Tier::Full => report.full += 1,
                    Tier::None => report.without_geometry += 1,
                },
                ResolutionOutcome::Skipped { reason } => {
                    report.skipped.push(SkippedItem { index, reason: reason.clone() })
                }
            }
        }
        report
    }

    pub fn created(&self) -> usize {
        self.exact + self.approximate + self.full + self.without_geometry
    }
}

impl CompositeAttributes {
    pub fn km_range(&self) -> KmRange {
        KmRange::new(self.km_start, self.km_end)
    }
}
