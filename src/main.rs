use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lead_intake_api::config::Config;
use lead_intake_api::api::handlers::{self, AppState};
use lead_intake_api::core::ingestion::IngestionPipeline;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, wires the ingestion pipeline
/// (loading the attribute rules before the listener opens) and starts
/// the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_intake_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let pipeline = IngestionPipeline::from_config(&config)?;
    let rule_count = pipeline.warm_catalog();
    tracing::info!("✓ Attribute rules ready: {}", rule_count);
    tracing::info!(
        "✓ Partner client initialized: {}",
        config.partner_base_url
    );

    let app_state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    // Health and docs bypass rate limiting
    let app = Router::new()
        .merge(handlers::public_routes())
        .merge(
            handlers::ingest_routes().layer(ServiceBuilder::new().layer(GovernorLayer {
                config: governor_conf,
            })),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
