//! Resolve command implementation

use crate::cli::{Cli, ResolveArgs};
use crate::output::OutputWriter;
use crate::storage::Storage;
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, JsonObject};
use roadspan_core::config::LayeredConfig;
use roadspan_core::models::{
    Geometry, ResolutionOutcome, ResolutionReport, WorkLocationRequest,
};
use roadspan_geo::models::to_geojson_geometry;
use roadspan_resolve::Resolver;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tabled::Tabled;

/// Accepted layouts of a requests file
#[derive(Deserialize)]
#[serde(untagged)]
enum RequestsFile {
    List(Vec<WorkLocationRequest>),
    Wrapped { requests: Vec<WorkLocationRequest> },
}

pub fn load_requests(path: &Path) -> Result<Vec<WorkLocationRequest>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read requests file {}", path.display()))?;
    let parsed: RequestsFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid requests file {}", path.display()))?;

    Ok(match parsed {
        RequestsFile::List(requests) | RequestsFile::Wrapped { requests } => requests,
    })
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn describe(geometry: Option<&Geometry>) -> String {
    match geometry {
        None => "no geometry".to_string(),
        Some(geometry) => {
            let points = geometry.coords().count();
            format!("{:?}, {} vertices", geometry.geometry_type(), points)
        }
    }
}

fn outcome_row(index: usize, request: &WorkLocationRequest, outcome: &ResolutionOutcome) -> OutcomeRow {
    match outcome {
        ResolutionOutcome::Created { geometry, tier, .. } => OutcomeRow {
            index,
            kind: request.kind(),
            status: "CREATED",
            tier: tier.to_string(),
            detail: describe(geometry.as_ref()),
        },
        ResolutionOutcome::Skipped { reason } => OutcomeRow {
            index,
            kind: request.kind(),
            status: "SKIPPED",
            tier: "-".to_string(),
            detail: reason.to_string(),
        },
    }
}

/// Created geometries as GeoJSON features tagged with their request index
pub fn feature_collection(outcomes: &[ResolutionOutcome]) -> FeatureCollection {
    let features = outcomes
        .iter()
        .enumerate()
        .filter_map(|(index, outcome)| match outcome {
            ResolutionOutcome::Created { geometry: Some(geometry), tier, attributes } => {
                let mut properties = JsonObject::new();
                properties.insert("index".to_string(), index.into());
                properties.insert("tier".to_string(), tier.as_str().into());
                if let Some(attributes) = attributes {
                    properties.insert("road_code".to_string(), attributes.road_code.clone().into());
                    properties.insert("km_start".to_string(), attributes.km_start.into());
                    properties.insert("km_end".to_string(), attributes.km_end.into());
                }
                Some(Feature {
                    geometry: Some(to_geojson_geometry(geometry)),
                    properties: Some(properties),
                    id: None,
                    bbox: None,
                    foreign_members: None,
                })
            }
            _ => None,
        })
        .collect();

    FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    }
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    outcomes: &'a [ResolutionOutcome],
    report: &'a ResolutionReport,
}

pub async fn execute(
    cli: &Cli,
    args: &ResolveArgs,
    layered: &LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    let requests = load_requests(&args.requests)?;
    let settings = layered.settings()?;
    let storage = Storage::new(cli.storage, cli.reference.as_deref()).await?;
    let resolver = Resolver::new(storage.highways, storage.segments, settings);

    tracing::info!(requests = requests.len(), concurrent = args.concurrent, "Resolving work locations");

    let outcomes = if args.concurrent {
        resolver.resolve_concurrent(&requests).await
    } else {
        resolver.resolve(&requests).await
    };
    let report = ResolutionReport::from_outcomes(&outcomes);

    if let Some(path) = &args.geojson {
        let collection = feature_collection(&outcomes);
        fs::write(path, serde_json::to_string_pretty(&collection)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !output.is_json() {
            output.info(format!(
                "Wrote {} feature(s) to {}",
                collection.features.len(),
                path.display()
            ));
        }
    }

    if output.is_json() {
        output.result(ResolveOutput { outcomes: &outcomes, report: &report })?;
        return Ok(());
    }

    output.section("Resolution");
    output.table(
        requests
            .iter()
            .zip(&outcomes)
            .enumerate()
            .map(|(index, (request, outcome))| outcome_row(index, request, outcome))
            .collect(),
    );

    output.section("Summary");
    output.kv("Exact", report.exact);
    output.kv("Approximate", report.approximate);
    output.kv("Full highway", report.full);
    output.kv("Without geometry", report.without_geometry);
    output.kv("Skipped", report.skipped.len());

    if report.skipped.is_empty() {
        output.success(format!("Created {} work location(s)", report.created()));
    } else {
        for item in &report.skipped {
            output.warning(format!("Request #{} will not be created: {}", item.index, item.reason));
        }
    }
    Ok(())
}
