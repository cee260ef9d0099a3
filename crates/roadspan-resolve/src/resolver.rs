//! Road identifier resolution

use roadspan_core::config::ResolverSettings;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{HighwayLookup, HighwayReference, RoadClass, WorkLocationRequest};
use roadspan_store::HighwayStore;

/// Canonical federal road code for a free-form route code.
///
/// `50`, `050`, `BR-50` and `br 050` all become `BR-050` with the default
/// settings. Codes that are not purely numeric are upper-cased and padded as
/// a whole, so `5a` becomes `BR-05A`.
pub fn canonical_route_code(raw: &str, settings: &ResolverSettings) -> Result<String> {
    let prefix = settings.federal_prefix.trim().to_uppercase();
    let prefix_letters = prefix.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());

    let upper = raw.trim().to_uppercase();
    let code = upper
        .strip_prefix(prefix_letters)
        .unwrap_or(upper.as_str())
        .trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '_');

    if code.is_empty() {
        return Err(RoadspanError::InvalidRequest {
            reason: format!("route code '{}' has no number", raw),
        });
    }

    let width = settings.route_code_min_digits;
    let number = if code.chars().all(|c| c.is_ascii_digit()) {
        // strip leading zeros before re-padding: "0050" -> "050"
        let trimmed = code.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        format!("{:0>width$}", digits, width = width)
    } else {
        format!("{:0>width$}", code, width = width)
    };

    Ok(format!("{}{}", prefix, number))
}

/// The store lookup a range request maps to
pub fn lookup_for(request: &WorkLocationRequest, settings: &ResolverSettings) -> Result<HighwayLookup> {
    match request {
        WorkLocationRequest::Federal { region_code, route_code, .. } => Ok(HighwayLookup::ByCode {
            region_code: region_code.clone(),
            class: RoadClass::Federal,
            road_code: canonical_route_code(route_code, settings)?,
        }),
        WorkLocationRequest::State { highway_id, .. } => Ok(HighwayLookup::ById(*highway_id)),
        WorkLocationRequest::FixedPoint { .. } => Err(RoadspanError::InvalidRequest {
            reason: "fixed-point locations do not reference a highway".to_string(),
        }),
    }
}

/// Find the highway a request refers to.
///
/// A miss is `HighwayNotFound`. For federal roads a handful of the region's
/// registered federal highways are logged first, since a miss there is
/// usually a formatting mismatch in the route code.
pub async fn resolve_highway(
    request: &WorkLocationRequest,
    highways: &dyn HighwayStore,
    settings: &ResolverSettings,
) -> Result<HighwayReference> {
    let lookup = lookup_for(request, settings)?;

    if let Some(highway) = highways.find_highway(&lookup).await? {
        tracing::debug!(highway = %highway.label(), "Resolved highway");
        return Ok(highway);
    }

    if let HighwayLookup::ByCode { region_code, class, road_code } = &lookup {
        log_nearby_highways(highways, region_code, *class, road_code, settings).await;
    }

    Err(RoadspanError::HighwayNotFound { lookup: lookup.to_string() })
}

async fn log_nearby_highways(
    highways: &dyn HighwayStore,
    region_code: &str,
    class: RoadClass,
    road_code: &str,
    settings: &ResolverSettings,
) {
    if settings.diagnostic_sample_size == 0 {
        return;
    }

    match highways.sample_highways(region_code, class, settings.diagnostic_sample_size).await {
        Ok(sample) => {
            let codes: Vec<&str> = sample.iter().map(|h| h.road_code.as_str()).collect();
            tracing::warn!(
                region = %region_code,
                road_code = %road_code,
                available = ?codes,
                "Highway not found in region"
            );
        }
        Err(e) => {
            tracing::debug!(error = %e, "Could not sample highways for diagnostics");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_route_code_variants() {
        let settings = ResolverSettings::default();
        for raw in ["50", "050", "BR-50", "br 050", "BR050", " br-0050 ", "Br_50"] {
            assert_eq!(canonical_route_code(raw, &settings).unwrap(), "BR-050", "input {:?}", raw);
        }
        assert_eq!(canonical_route_code("381", &settings).unwrap(), "BR-381");
        assert_eq!(canonical_route_code("1", &settings).unwrap(), "BR-001");
    }

    #[test]
    fn test_canonical_route_code_non_numeric() {
        let settings = ResolverSettings::default();
        assert_eq!(canonical_route_code("101a", &settings).unwrap(), "BR-101A");
        assert_eq!(canonical_route_code("5a", &settings).unwrap(), "BR-05A");
    }

    #[test]
    fn test_canonical_route_code_respects_settings() {
        let settings = ResolverSettings {
            federal_prefix: "RJ-".to_string(),
            route_code_min_digits: 4,
            ..Default::default()
        };
        assert_eq!(canonical_route_code("rj 50", &settings).unwrap(), "RJ-0050");
    }

    #[test]
    fn test_canonical_route_code_rejects_empty() {
        let settings = ResolverSettings::default();
        assert!(canonical_route_code("BR-", &settings).is_err());
        assert!(canonical_route_code("  ", &settings).is_err());
    }

    #[test]
    fn test_fixed_point_has_no_lookup() {
        let request = WorkLocationRequest::FixedPoint { latitude: 0.0, longitude: 0.0, label: None };
        assert!(lookup_for(&request, &ResolverSettings::default()).is_err());
    }
}
