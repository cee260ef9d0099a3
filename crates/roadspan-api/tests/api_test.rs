//! HTTP round trips through the router with in-memory reference data

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use roadspan_api::{create_router, AppState, StorageBackend};
use roadspan_core::config::ResolverSettings;
use roadspan_core::models::{
    Geometry, HighwayId, HighwayReference, RoadClass, RoadSegment, SegmentId, SourceGeometry,
};
use roadspan_resolve::Resolver;
use roadspan_store::{MemoryHighwayStore, MemorySegmentStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let highways: MemoryHighwayStore = vec![
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
        },
        HighwayReference {
            id: HighwayId(42),
            region_code: "SP".to_string(),
            road_code: "SP-042".to_string(),
            name: "SP-042".to_string(),
            class: RoadClass::State,
            km_range: Some(roadspan_core::models::KmRange::new(0.0, 50.0)),
            geometry: None,
        },
    ]
    .into_iter()
    .collect();
    let segments: MemorySegmentStore = vec![RoadSegment {
        id: SegmentId(1),
        region_code: "SP".to_string(),
        road_code: "BR-050".to_string(),
        km_start: 0.0,
        km_end: 15.0,
        geometry: SourceGeometry::wgs84(Geometry::line_string(vec![[0.0, -20.0], [15.0, -20.0]])),
    }]
    .into_iter()
    .collect();

    let resolver = Resolver::new(Arc::new(highways), Arc::new(segments), ResolverSettings::default());
    create_router(Arc::new(AppState::new(resolver, StorageBackend::Memory)))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_resolve_batch() {
    let body = json!({
        "requests": [
            { "kind": "FEDERAL", "region_code": "SP", "route_code": "50", "km_start": 10.0, "km_end": 20.0 },
            { "kind": "FEDERAL", "region_code": "SP", "route_code": "999", "km_start": 1.0, "km_end": 2.0 },
            { "kind": "STATE", "highway_id": 42, "km_start": 5.0, "km_end": 8.0 },
            { "kind": "FIXED_POINT", "latitude": -23.55, "longitude": -46.63 }
        ]
    });

    let (status, json) = send(app(), "POST", "/api/v1/resolve", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let outcomes = json["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0]["tier"], "EXACT");
    assert_eq!(outcomes[0]["geometry"]["type"], "LineString");
    assert_eq!(outcomes[1]["status"], "SKIPPED");
    assert_eq!(outcomes[2]["status"], "CREATED");
    assert_eq!(outcomes[2]["tier"], "NONE");
    assert!(outcomes[2]["geometry"].is_null());
    assert_eq!(outcomes[3]["geometry"]["coordinates"], json!([-46.63, -23.55]));

    assert_eq!(json["report"]["skipped"][0]["index"], 1);
}

#[tokio::test]
async fn test_resolve_rejects_malformed_body() {
    let (status, json) =
        send(app(), "POST", "/api/v1/resolve", Some(json!({ "requests": [{ "kind": "BRIDGE" }] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Malformed request body");
}

#[tokio::test]
async fn test_validate_km() {
    let (status, json) = send(
        app(),
        "POST",
        "/api/v1/highways/42/validate-km",
        Some(json!({ "km_start": 40.0, "km_end": 60.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["highway_id"], 42);
    assert_eq!(json["valid"], false);
    assert_eq!(json["coverage"], "highway_range");
    assert_eq!(json["gaps"][0]["start"], 50.0);

    let (status, _) = send(
        app(),
        "POST",
        "/api/v1/highways/7/validate-km",
        Some(json!({ "km_start": 1.0, "km_end": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_locate_round_trip() {
    let location = json!({ "kind": "FEDERAL", "region_code": "SP", "route_code": "50", "km_start": 10.0, "km_end": 15.0 });

    let (status, point) = send(
        app(),
        "POST",
        "/api/v1/locate/point",
        Some(json!({ "location": location.clone(), "km": 12.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(point["tier"], "EXACT");
    assert!((point["longitude"].as_f64().unwrap() - 12.0).abs() < 1e-6);

    let (status, km) = send(
        app(),
        "POST",
        "/api/v1/locate/km",
        Some(json!({ "location": location.clone(), "latitude": -19.5, "longitude": 13.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((km["km"].as_f64().unwrap() - 13.0).abs() < 1e-6);

    let (status, _) = send(
        app(),
        "POST",
        "/api/v1/locate/point",
        Some(json!({ "location": location.clone(), "km": 30.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
