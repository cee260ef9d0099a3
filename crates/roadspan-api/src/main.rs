use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use roadspan_store::postgres::{PostgresConfig, PostgresStore};
use roadspan_store::{
    HighwayStore, MemoryHighwayStore, MemorySegmentStore, ReferenceData, SegmentStore,
};
use roadspan_resolve::Resolver;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roadspan_api::{create_router, ApiConfig, AppState, StorageBackend};

type Stores = (Arc<dyn HighwayStore>, Arc<dyn SegmentStore>, StorageBackend);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roadspan_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();
    let settings = config.resolver_settings().context("Invalid resolver configuration")?;

    tracing::info!(
        port = config.port,
        target_srid = settings.target_srid,
        postgres = config.uses_postgres(),
        "Starting roadspan API server"
    );

    let (highways, segments, storage) = init_storage(&config).await?;
    let state = Arc::new(AppState::new(Resolver::new(highways, segments, settings), storage));

    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = create_router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// PostgreSQL when DATABASE_URL is set, otherwise reference data in memory
async fn init_storage(config: &ApiConfig) -> anyhow::Result<Stores> {
    if config.uses_postgres() {
        tracing::info!("DATABASE_URL found, connecting to PostgreSQL...");
        let pg_config = PostgresConfig::from_env().context("Invalid PostgreSQL configuration")?;
        let store = PostgresStore::new(pg_config).await.map_err(|e| {
            tracing::error!(
                "Remediation:\n\
                1. Ensure PostgreSQL is running\n\
                2. Verify DATABASE_URL is correct\n\
                3. Check that the highway and segment tables exist"
            );
            anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e)
        })?;
        let store = Arc::new(store);
        let highways: Arc<dyn HighwayStore> = store.clone();
        let segments: Arc<dyn SegmentStore> = store;
        return Ok((highways, segments, StorageBackend::Postgres));
    }

    match &config.reference_file {
        Some(path) => {
            let data = ReferenceData::load(path)
                .with_context(|| format!("Failed to load reference data from {}", path.display()))?;
            tracing::info!(
                highways = data.highways.len(),
                segments = data.segments.len(),
                "Serving reference data from memory"
            );
            let (highways, segments) = data.into_stores();
            let highways: Arc<dyn HighwayStore> = Arc::new(highways);
            let segments: Arc<dyn SegmentStore> = Arc::new(segments);
            Ok((highways, segments, StorageBackend::Memory))
        }
        None => {
            tracing::warn!(
                "No reference data configured (set DATABASE_URL or ROADSPAN_REFERENCE_FILE); \
                every range request will be skipped"
            );
            let highways: Arc<dyn HighwayStore> = Arc::new(MemoryHighwayStore::new());
            let segments: Arc<dyn SegmentStore> = Arc::new(MemorySegmentStore::new());
            Ok((highways, segments, StorageBackend::Memory))
        }
    }
}
