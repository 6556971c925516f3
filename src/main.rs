use api_rest::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the camp forms server
///
/// Serves the REST API (with Swagger UI) backed by the configured submission sink.
///
/// # Environment Variables
/// - `CAMP_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CAMP_SINK`: `sheet` (default) or `commerce`
/// - `GOOGLE_SHEET_ID`, `GOOGLE_SHEET_RANGE`, `GOOGLE_SHEETS_TOKEN`, `GOOGLE_SHEETS_BASE_URL`:
///   spreadsheet sink settings
/// - `WOO_BASE_URL`, `WOO_CONSUMER_KEY`, `WOO_CONSUMER_SECRET`: commerce sink settings
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is incomplete or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("camp_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("camp_sinks=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CAMP_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let state = match AppState::from_env() {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("-- Sink configuration error: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("++ Starting camp REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
