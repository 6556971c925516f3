//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the workspace's `camp-run` wrapper.
//!
//! ## Intended use
//! Development and debugging of the HTTP surface (with OpenAPI/Swagger UI).

use api_rest::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the camp REST API server
///
/// # Environment Variables
/// - `CAMP_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CAMP_SINK` and the sink credentials read by `camp_sinks::SinkEnv`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the sink configuration is incomplete, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CAMP_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting camp REST API on {}", addr);

    let app = router(AppState::from_env()?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
