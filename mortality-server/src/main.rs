//! ED Mortality Risk - Prediction API Server
//!
//! HTTP front for the mortality risk classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   MORTALITY RISK SERVER                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────────┐   ┌────────────────────┐  │
//! │  │  API      │──▶│ FeatureBuilder│──▶│  RiskClassifier    │  │
//! │  │  (Axum)   │   └───────────────┘   │  (ModelStore)      │  │
//! │  └─────┬─────┘                       └────────────────────┘  │
//! │        │ fire-and-forget                                     │
//! │        ▼                                                     │
//! │  ┌──────────────┐        ┌───────────────────┐               │
//! │  │ TelemetrySink│───────▶│  Google Sheets    │               │
//! │  └──────────────┘        └───────────────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mortality_core::{ModelState, ModelStore, TelemetrySink};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (JSON lines in production)
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "mortality_server=debug,mortality_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Mortality risk server starting ({})...", config.environment);

    // Load the model once; a missing artifact is not fatal
    let store = Arc::new(
        ModelStore::new(&config.model_path).with_checksum(config.model_sha256.clone()),
    );
    match store.load() {
        ModelState::Ready(bundle) => tracing::info!(
            "Model ready: {} (threshold {:.3})",
            config.model_path,
            bundle.threshold().value()
        ),
        ModelState::Unavailable { reason } => {
            tracing::warn!("Model unavailable, predictions will return 503: {}", reason)
        }
    }

    let telemetry = TelemetrySink::google(config.telemetry.clone())
        .context("Failed to create Google Sheets client")?;
    tracing::info!(
        "Telemetry: {} ({} rows)",
        if telemetry.is_enabled() { "enabled" } else { "disabled" },
        config.telemetry.row_schema
    );

    // Build application state
    let state = AppState {
        store,
        telemetry,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ModelStore>,
    pub telemetry: TelemetrySink,
    pub config: config::Config,
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/model", get(handlers::model::info))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/telemetry/diagnostics", get(handlers::telemetry::diagnostics))
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
