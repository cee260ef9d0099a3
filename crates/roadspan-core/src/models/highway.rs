//! Highway reference data: registered roads and their surveyed segments.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::SourceGeometry;

/// Unique identifier for a highway record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HighwayId(pub u64);

impl fmt::Display for HighwayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a surveyed road segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u64);

/// Administrative class of a highway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoadClass {
    Federal,
    State,
}

impl RoadClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadClass::Federal => "FEDERAL",
            RoadClass::State => "STATE",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed kilometer interval along a highway
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KmRange {
    pub start: f64,
    pub end: f64,
}

impl KmRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length in kilometers (negative for a reversed range)
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }

    /// The same interval with `start <= end`
    pub fn normalized(&self) -> Self {
        if self.is_reversed() {
            Self::new(self.end, self.start)
        } else {
            *self
        }
    }

    /// Closed-interval overlap test
    pub fn overlaps(&self, other: &KmRange) -> bool {
        self.end >= other.start && self.start <= other.end
    }

    pub fn contains(&self, km: f64) -> bool {
        km >= self.start && km <= self.end
    }

    pub fn contains_range(&self, other: &KmRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

impl fmt::Display for KmRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "km {} - {}", self.start, self.end)
    }
}

/// Canonical record for one administratively registered road
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighwayReference {
    pub id: HighwayId,
    /// State-level jurisdiction, e.g. `SP`
    pub region_code: String,
    /// Canonical road code, e.g. `BR-050`
    pub road_code: String,
    pub name: String,
    pub class: RoadClass,
    /// Surveyed extent of the road, when the registry carries one
    #[serde(default)]
    pub km_range: Option<KmRange>,
    /// Full-length reference line
    #[serde(default)]
    pub geometry: Option<SourceGeometry>,
}

impl HighwayReference {
    /// Short human-readable label used in logs and errors
    pub fn label(&self) -> String {
        format!("{} ({}, {})", self.road_code, self.region_code, self.class)
    }
}

/// A contiguous surveyed sub-range of one highway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub region_code: String,
    /// Road identifier the survey was recorded under; may be a branch such
    /// as `SP-055/1`
    pub road_code: String,
    pub km_start: f64,
    pub km_end: f64,
    pub geometry: SourceGeometry,
}

impl RoadSegment {
    pub fn km_range(&self) -> KmRange {
        KmRange::new(self.km_start, self.km_end)
    }
}

/// How a highway is looked up in the reference store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighwayLookup {
    /// By region, class and canonical road code
    ByCode {
        region_code: String,
        class: RoadClass,
        road_code: String,
    },
    /// Directly by record id
    ById(HighwayId),
}

impl fmt::Display for HighwayLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighwayLookup::ByCode { region_code, class, road_code } => {
                write!(f, "{} {} in {}", class, road_code, region_code)
            }
            HighwayLookup::ById(id) => write!(f, "highway #{}", id),
        }
    }
}

/// Predicate deciding whether a segment's road identifier belongs to a
/// highway.
///
/// Segments are keyed by free-text road identifiers rather than a foreign
/// key. A segment matches when its identifier equals the highway's canonical
/// code, equals the display name, or is a branch of the display name
/// (`<name><separator><suffix>`, e.g. `SP-055/1` for `SP-055`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadMatcher {
    pub code: String,
    pub name: String,
    pub branch_separator: String,
}

impl RoadMatcher {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        branch_separator: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            branch_separator: branch_separator.into(),
        }
    }

    pub fn for_highway(highway: &HighwayReference, branch_separator: &str) -> Self {
        Self::new(&highway.road_code, &highway.name, branch_separator)
    }

    pub fn matches(&self, road_code: &str) -> bool {
        road_code == self.code || road_code == self.name || self.is_branch(road_code)
    }

    /// True when `road_code` is `<name><separator>...`
    pub fn is_branch(&self, road_code: &str) -> bool {
        if self.name.is_empty() || self.branch_separator.is_empty() {
            return false;
        }
        road_code
            .strip_prefix(self.name.as_str())
            .is_some_and(|rest| rest.starts_with(self.branch_separator.as_str()))
    }

    /// SQL `LIKE` pattern equivalent to [`RoadMatcher::is_branch`], with
    /// wildcards in the name escaped (escape character `\`).
    /// `None` when branch matching is disabled.
    pub fn branch_like_pattern(&self) -> Option<String> {
        if self.name.is_empty() || self.branch_separator.is_empty() {
            return None;
        }
        let escape = |s: &str| s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        Some(format!("{}{}%", escape(&self.name), escape(&self.branch_separator)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_km_range_overlap_is_closed() {
        let requested = KmRange::new(10.0, 20.0);
        assert!(KmRange::new(0.0, 10.0).overlaps(&requested));
        assert!(KmRange::new(20.0, 30.0).overlaps(&requested));
        assert!(KmRange::new(12.0, 13.0).overlaps(&requested));
        assert!(!KmRange::new(0.0, 9.99).overlaps(&requested));
        assert!(!KmRange::new(20.01, 30.0).overlaps(&requested));
    }

    #[test]
    fn test_km_range_normalized() {
        let reversed = KmRange::new(20.0, 10.0);
        assert!(reversed.is_reversed());
        assert_eq!(reversed.normalized(), KmRange::new(10.0, 20.0));
        assert_eq!(KmRange::new(1.0, 2.0).normalized(), KmRange::new(1.0, 2.0));
    }

    #[test]
    fn test_matcher_exact_code_and_name() {
        let matcher = RoadMatcher::new("SP-055", "SP-055", "/");
        assert!(matcher.matches("SP-055"));
        assert!(!matcher.matches("SP-0551"));
        assert!(!matcher.matches("SP-05"));
    }

    #[test]
    fn test_matcher_branch() {
        let matcher = RoadMatcher::new("055-SP", "SP-055", "/");
        assert!(matcher.matches("055-SP"));
        assert!(matcher.matches("SP-055/1"));
        assert!(matcher.matches("SP-055/ACESSO"));
        assert!(!matcher.matches("SP-055-1"));
        assert!(!matcher.matches("SP-0551/1"));
    }

    #[test]
    fn test_matcher_branch_disabled() {
        let matcher = RoadMatcher::new("SP-055", "SP-055", "");
        assert!(!matcher.is_branch("SP-055/1"));
        assert!(matcher.branch_like_pattern().is_none());

        let unnamed = RoadMatcher::new("SP-055", "", "/");
        assert!(!unnamed.matches("/1"));
    }

    #[test]
    fn test_branch_like_pattern_escapes_wildcards() {
        let matcher = RoadMatcher::new("X", "SP_055%", "/");
        assert_eq!(matcher.branch_like_pattern().unwrap(), "SP\\_055\\%/%");
    }

    #[test]
    fn test_lookup_display() {
        let lookup = HighwayLookup::ByCode {
            region_code: "SP".to_string(),
            class: RoadClass::Federal,
            road_code: "BR-050".to_string(),
        };
        assert_eq!(lookup.to_string(), "FEDERAL BR-050 in SP");
        assert_eq!(HighwayLookup::ById(HighwayId(42)).to_string(), "highway #42");
    }
}
