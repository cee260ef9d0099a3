//! End-to-end resolution over in-memory reference data

use async_trait::async_trait;
use roadspan_core::config::ResolverSettings;
use roadspan_core::error::{Result, RoadspanError};
use roadspan_core::models::{
    Geometry, HighwayId, HighwayLookup, HighwayReference, KmRange, ResolutionOutcome,
    ResolutionReport, RoadClass, RoadSegment, SegmentId, SkipReason, SourceGeometry, Tier,
    WorkLocationRequest,
};
use roadspan_resolve::validation::Coverage;
use roadspan_resolve::Resolver;
use roadspan_store::{HighwayStore, MemoryHighwayStore, MemorySegmentStore, SegmentStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const EPS: f64 = 1e-9;

fn federal_highway() -> HighwayReference {
    HighwayReference {
        id: HighwayId(1),
        region_code: "SP".to_string(),
        road_code: "BR-050".to_string(),
        name: "BR-050/SP".to_string(),
        class: RoadClass::Federal,
        km_range: None,
        geometry: Some(SourceGeometry::wgs84(Geometry::line_string(vec![
            [0.0, -20.0],
            [100.0, -20.0],
        ]))),
    }
}

fn state_highway(id: u64, road_code: &str, geometry: Option<Geometry>) -> HighwayReference {
    HighwayReference {
        id: HighwayId(id),
        region_code: "SP".to_string(),
        road_code: road_code.to_string(),
        name: road_code.to_string(),
        class: RoadClass::State,
        km_range: None,
        geometry: geometry.map(SourceGeometry::wgs84),
    }
}

fn segment(id: u64, road_code: &str, km: (f64, f64), geometry: SourceGeometry) -> RoadSegment {
    RoadSegment {
        id: SegmentId(id),
        region_code: "SP".to_string(),
        road_code: road_code.to_string(),
        km_start: km.0,
        km_end: km.1,
        geometry,
    }
}

fn line(coords: Vec<[f64; 2]>) -> SourceGeometry {
    SourceGeometry::wgs84(Geometry::line_string(coords))
}

fn resolver(highways: Vec<HighwayReference>, segments: Vec<RoadSegment>) -> Resolver {
    let highways: MemoryHighwayStore = highways.into_iter().collect();
    let segments: MemorySegmentStore = segments.into_iter().collect();
    Resolver::new(Arc::new(highways), Arc::new(segments), ResolverSettings::default())
}

fn federal(route_code: &str, km_start: f64, km_end: f64) -> WorkLocationRequest {
    WorkLocationRequest::Federal {
        region_code: "SP".to_string(),
        route_code: route_code.to_string(),
        km_start,
        km_end,
    }
}

fn state(id: u64, km_start: f64, km_end: f64) -> WorkLocationRequest {
    WorkLocationRequest::State { highway_id: HighwayId(id), km_start, km_end }
}

fn line_coords(outcome: &ResolutionOutcome) -> Vec<[f64; 2]> {
    match outcome.geometry() {
        Some(Geometry::LineString { coordinates }) => coordinates.clone(),
        other => panic!("Expected LineString, got {:?}", other),
    }
}

fn assert_coords_close(actual: &[[f64; 2]], expected: &[[f64; 2]]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!((a[0] - e[0]).abs() < 1e-6 && (a[1] - e[1]).abs() < 1e-6, "{:?} vs {:?}", a, e);
    }
}

#[tokio::test]
async fn test_segment_clip_truncates_to_coverage() {
    let resolver = resolver(
        vec![federal_highway()],
        vec![segment(1, "BR-050", (0.0, 15.0), line(vec![[0.0, -20.0], [15.0, -20.0]]))],
    );

    let outcomes = resolver.resolve(&[federal("50", 10.0, 20.0)]).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].tier(), Some(Tier::Exact));
    assert_coords_close(&line_coords(&outcomes[0]), &[[10.0, -20.0], [15.0, -20.0]]);
}

#[tokio::test]
async fn test_no_segments_gives_approximate_cut() {
    let resolver = resolver(vec![federal_highway()], vec![]);

    let outcomes = resolver.resolve(&[federal("50", 10.0, 20.0)]).await;

    assert_eq!(outcomes[0].tier(), Some(Tier::Approximate));
    // fractions 0.010 and 0.020 of a 100-unit line
    assert_coords_close(&line_coords(&outcomes[0]), &[[1.0, -20.0], [2.0, -20.0]]);
}

#[tokio::test]
async fn test_state_highway_without_geometry_is_created_without_geometry() {
    let resolver = resolver(vec![state_highway(42, "SP-042", None)], vec![]);

    let outcomes = resolver.resolve(&[state(42, 5.0, 8.0)]).await;

    assert_eq!(outcomes, vec![ResolutionOutcome::unresolved()]);
    let json = serde_json::to_value(&outcomes[0]).unwrap();
    assert_eq!(json["status"], "CREATED");
    assert!(json["geometry"].is_null());
    assert_eq!(json["tier"], "NONE");
}

#[tokio::test]
async fn test_fixed_point_is_exact_point() {
    let resolver = resolver(vec![], vec![]);
    let request = WorkLocationRequest::FixedPoint { latitude: -23.55, longitude: -46.63, label: None };

    let outcomes = resolver.resolve(&[request]).await;

    assert_eq!(outcomes[0].tier(), Some(Tier::Exact));
    assert_eq!(outcomes[0].geometry(), Some(&Geometry::point(-46.63, -23.55)));
}

#[tokio::test]
async fn test_fixed_point_coordinates_are_taken_as_given() {
    let resolver = resolver(vec![], vec![]);
    let request = WorkLocationRequest::FixedPoint { latitude: 95.0, longitude: 200.0, label: None };

    let outcomes = resolver.resolve(&[request]).await;

    assert!(!outcomes[0].is_skipped());
    assert_eq!(outcomes[0].tier(), Some(Tier::Exact));
    assert_eq!(outcomes[0].geometry(), Some(&Geometry::point(200.0, 95.0)));
}

#[tokio::test]
async fn test_unknown_highway_is_skipped() {
    let resolver = resolver(vec![federal_highway()], vec![]);

    let outcomes = resolver.resolve(&[federal("999", 1.0, 2.0), federal("50", 1.0, 2.0)]).await;

    assert!(outcomes[0].is_skipped());
    assert_eq!(outcomes[0].tier(), None);
    match &outcomes[0] {
        ResolutionOutcome::Skipped { reason: SkipReason::HighwayNotFound { lookup } } => {
            assert!(lookup.contains("BR-999"), "{}", lookup);
        }
        other => panic!("Expected HighwayNotFound skip, got {:?}", other),
    }
    assert!(!outcomes[1].is_skipped());

    let report = ResolutionReport::from_outcomes(&outcomes);
    assert_eq!(report.created(), 1);
    assert_eq!(report.skipped[0].index, 0);
}

#[tokio::test]
async fn test_invalid_request_is_skipped() {
    let resolver = resolver(vec![federal_highway()], vec![]);

    let outcomes = resolver.resolve(&[federal("50", f64::NAN, 2.0)]).await;

    assert!(matches!(
        outcomes[0],
        ResolutionOutcome::Skipped { reason: SkipReason::InvalidRequest { .. } }
    ));
}

#[tokio::test]
async fn test_reversed_range_matches_normalized() {
    let resolver = resolver(
        vec![federal_highway()],
        vec![segment(1, "BR-050", (0.0, 15.0), line(vec![[0.0, -20.0], [15.0, -20.0]]))],
    );

    let reversed = resolver.resolve(&[federal("50", 12.0, 4.0)]).await;
    let ordered = resolver.resolve(&[federal("50", 4.0, 12.0)]).await;

    assert_eq!(reversed, ordered);
}

#[tokio::test]
async fn test_branch_segments_match_but_prefixes_do_not() {
    let resolver = resolver(
        vec![state_highway(7, "SP-055", None)],
        vec![
            segment(1, "SP-055", (0.0, 10.0), line(vec![[-47.0, -23.0], [-46.9, -23.0]])),
            segment(2, "SP-055/1", (10.0, 20.0), line(vec![[-46.9, -23.0], [-46.8, -23.0]])),
            segment(3, "SP-0551", (20.0, 30.0), line(vec![[-46.8, -23.0], [-46.7, -23.0]])),
        ],
    );

    let outcomes = resolver.resolve(&[state(7, 0.0, 30.0)]).await;

    assert_eq!(outcomes[0].tier(), Some(Tier::Exact));
    match &outcomes[0] {
        ResolutionOutcome::Created { geometry: Some(Geometry::MultiLineString { coordinates }), attributes, .. } => {
            assert_eq!(coordinates.len(), 2);
            assert!(coordinates.iter().flatten().all(|c| c[0] <= -46.8 + EPS));
            let attributes = attributes.as_ref().expect("composite attributes");
            assert_eq!(attributes.road_code, "SP-055");
            assert_eq!(attributes.km_range(), KmRange::new(0.0, 30.0));
        }
        other => panic!("Expected MultiLineString, got {:?}", other),
    }
}

#[tokio::test]
async fn test_degenerate_segment_is_ignored() {
    let resolver = resolver(
        vec![federal_highway()],
        vec![
            segment(1, "BR-050", (5.0, 5.0), line(vec![[5.0, -20.0], [5.0, -20.0]])),
            segment(2, "BR-050", (0.0, 10.0), line(vec![[0.0, -20.0], [10.0, -20.0]])),
        ],
    );

    let outcomes = resolver.resolve(&[federal("50", 2.0, 8.0)]).await;

    assert_eq!(outcomes[0].tier(), Some(Tier::Exact));
    assert_coords_close(&line_coords(&outcomes[0]), &[[2.0, -20.0], [8.0, -20.0]]);
}

#[tokio::test]
async fn test_unusable_segment_geometry_falls_back() {
    let resolver = resolver(
        vec![federal_highway()],
        vec![segment(1, "BR-050", (0.0, 10.0), line(vec![[3.0, -20.0], [3.0, -20.0]]))],
    );

    let outcomes = resolver.resolve(&[federal("50", 2.0, 8.0)]).await;

    assert_eq!(outcomes[0].tier(), Some(Tier::Approximate));
}

#[tokio::test]
async fn test_range_beyond_nominal_length_is_full() {
    let resolver = resolver(vec![federal_highway()], vec![]);

    let outcomes = resolver.resolve(&[federal("BR-050", 1100.0, 1200.0)]).await;

    assert_eq!(outcomes[0].tier(), Some(Tier::Full));
    assert_eq!(line_coords(&outcomes[0]), vec![[0.0, -20.0], [100.0, -20.0]]);
}

#[tokio::test]
async fn test_mistagged_mercator_segment_is_reprojected() {
    let mercator = SourceGeometry::wgs84(Geometry::line_string(vec![
        [1_113_194.907_932_735_7, 0.0],
        [2_226_389.815_865_471_5, 0.0],
    ]));
    let resolver = resolver(vec![federal_highway()], vec![segment(1, "BR-050", (0.0, 10.0), mercator)]);

    let outcomes = resolver.resolve(&[federal("50", 0.0, 10.0)]).await;

    assert_eq!(outcomes[0].tier(), Some(Tier::Exact));
    assert_coords_close(&line_coords(&outcomes[0]), &[[10.0, 0.0], [20.0, 0.0]]);
}

#[tokio::test]
async fn test_concurrent_matches_sequential_and_is_idempotent() {
    let resolver = resolver(
        vec![federal_highway(), state_highway(42, "SP-042", None)],
        vec![segment(1, "BR-050", (0.0, 15.0), line(vec![[0.0, -20.0], [15.0, -20.0]]))],
    );
    let requests = vec![
        federal("50", 10.0, 20.0),
        federal("50", 30.0, 40.0),
        federal("999", 1.0, 2.0),
        state(42, 5.0, 8.0),
        WorkLocationRequest::FixedPoint { latitude: -23.55, longitude: -46.63, label: None },
        federal("50", 2000.0, 2100.0),
    ];

    let sequential = resolver.resolve(&requests).await;
    let concurrent = resolver.resolve_concurrent(&requests).await;
    let again = resolver.resolve(&requests).await;

    assert_eq!(sequential.len(), requests.len());
    assert_eq!(sequential, concurrent);
    assert_eq!(sequential, again);

    let tiers: Vec<Option<Tier>> = sequential.iter().map(|o| o.tier()).collect();
    assert_eq!(
        tiers,
        vec![
            Some(Tier::Exact),
            Some(Tier::Approximate),
            None,
            Some(Tier::None),
            Some(Tier::Exact),
            Some(Tier::Full),
        ]
    );
}

struct UnreachableStore;

#[async_trait]
impl HighwayStore for UnreachableStore {
    async fn find_highway(&self, _lookup: &HighwayLookup) -> Result<Option<HighwayReference>> {
        Err(RoadspanError::Store("connection refused".to_string()))
    }

    async fn sample_highways(
        &self,
        _region_code: &str,
        _class: RoadClass,
        _limit: usize,
    ) -> Result<Vec<HighwayReference>> {
        Err(RoadspanError::Store("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_store_failure_is_isolated_to_its_request() {
    let segments: Arc<dyn SegmentStore> = Arc::new(MemorySegmentStore::new());
    let resolver = Resolver::new(Arc::new(UnreachableStore), segments, ResolverSettings::default());
    let requests = vec![
        federal("50", 1.0, 2.0),
        WorkLocationRequest::FixedPoint { latitude: 1.0, longitude: 2.0, label: None },
    ];

    let outcomes = resolver.resolve(&requests).await;

    assert!(matches!(
        outcomes[0],
        ResolutionOutcome::Skipped { reason: SkipReason::LookupFailed { .. } }
    ));
    assert_eq!(outcomes[1].tier(), Some(Tier::Exact));
}

/// Memory store that counts diagnostic sampling calls
struct SamplingStore {
    inner: MemoryHighwayStore,
    samples: AtomicUsize,
    sample_fails: bool,
}

impl SamplingStore {
    fn new(sample_fails: bool) -> Arc<Self> {
        Arc::new(Self {
            inner: vec![federal_highway(), state_highway(7, "SP-055", None)].into_iter().collect(),
            samples: AtomicUsize::new(0),
            sample_fails,
        })
    }

    fn samples(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HighwayStore for SamplingStore {
    async fn find_highway(&self, lookup: &HighwayLookup) -> Result<Option<HighwayReference>> {
        self.inner.find_highway(lookup).await
    }

    async fn sample_highways(
        &self,
        region_code: &str,
        class: RoadClass,
        limit: usize,
    ) -> Result<Vec<HighwayReference>> {
        self.samples.fetch_add(1, Ordering::SeqCst);
        if self.sample_fails {
            return Err(RoadspanError::Store("connection reset".to_string()));
        }
        self.inner.sample_highways(region_code, class, limit).await
    }
}

fn sampling_resolver(store: &Arc<SamplingStore>) -> Resolver {
    let highways: Arc<dyn HighwayStore> = store.clone();
    let segments: Arc<dyn SegmentStore> = Arc::new(MemorySegmentStore::new());
    Resolver::new(highways, segments, ResolverSettings::default())
}

fn is_not_found(outcome: &ResolutionOutcome) -> bool {
    matches!(outcome, ResolutionOutcome::Skipped { reason: SkipReason::HighwayNotFound { .. } })
}

#[tokio::test]
async fn test_federal_miss_samples_region_highways() {
    let store = SamplingStore::new(false);
    let resolver = sampling_resolver(&store);

    let outcomes = resolver.resolve(&[federal("999", 1.0, 2.0)]).await;

    assert!(is_not_found(&outcomes[0]));
    assert_eq!(store.samples(), 1);

    resolver.resolve(&[federal("50", 1.0, 2.0)]).await;
    assert_eq!(store.samples(), 1, "a hit must not sample");
}

#[tokio::test]
async fn test_state_miss_does_not_sample() {
    let store = SamplingStore::new(false);
    let resolver = sampling_resolver(&store);

    let outcomes = resolver.resolve(&[state(404, 1.0, 2.0)]).await;

    assert!(is_not_found(&outcomes[0]));
    assert_eq!(store.samples(), 0);
}

#[tokio::test]
async fn test_failed_sample_still_reports_not_found() {
    let store = SamplingStore::new(true);
    let resolver = sampling_resolver(&store);

    let outcomes = resolver.resolve(&[federal("999", 1.0, 2.0)]).await;

    assert!(is_not_found(&outcomes[0]));
    assert_eq!(store.samples(), 1);
}

#[tokio::test]
async fn test_validate_km_through_resolver() {
    let resolver = resolver(
        vec![state_highway(7, "SP-055", None)],
        vec![
            segment(1, "SP-055", (0.0, 10.0), line(vec![[-47.0, -23.0], [-46.9, -23.0]])),
            segment(2, "SP-055/1", (12.0, 20.0), line(vec![[-46.9, -23.0], [-46.8, -23.0]])),
        ],
    );

    let covered = resolver.validate_km(HighwayId(7), KmRange::new(2.0, 8.0)).await.unwrap();
    assert!(covered.valid);
    assert_eq!(covered.coverage, Coverage::Segments);

    let gap = resolver.validate_km(HighwayId(7), KmRange::new(5.0, 15.0)).await.unwrap();
    assert!(!gap.valid);
    assert_eq!(gap.gaps.len(), 1);

    let missing = resolver.validate_km(HighwayId(99), KmRange::new(0.0, 1.0)).await;
    assert!(matches!(missing, Err(RoadspanError::HighwayNotFound { .. })));
}

#[tokio::test]
async fn test_point_and_km_conversions() {
    let resolver = resolver(
        vec![federal_highway()],
        vec![segment(1, "BR-050", (0.0, 20.0), line(vec![[0.0, -20.0], [20.0, -20.0]]))],
    );
    let request = federal("50", 10.0, 20.0);

    let (position, tier) = resolver.point_at_km(&request, 15.0).await.unwrap();
    assert_eq!(tier, Tier::Exact);
    assert!((position.longitude - 15.0).abs() < 1e-6);

    let (located, _) = resolver.locate_km(&request, -19.9, 12.0).await.unwrap();
    assert!((located.km - 12.0).abs() < 1e-6);
    assert!((located.latitude - -20.0).abs() < 1e-6);

    let outside = resolver.point_at_km(&request, 25.0).await;
    assert!(matches!(outside, Err(RoadspanError::KmOutOfRange { .. })));

    let unknown = resolver.point_at_km(&federal("999", 1.0, 2.0), 1.5).await;
    assert!(matches!(unknown, Err(RoadspanError::HighwayNotFound { .. })));
}
