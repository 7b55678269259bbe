//! URL Arbiter Server
//!
//! Classifies submitted URLs as safe or malicious. A local model gives a
//! first opinion, a remote LLM arbiter gives the final one, and every scan is
//! kept in an audit log.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       URL ARBITER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  POST /scan                                                 │
//! │     │                                                       │
//! │     ▼                                                       │
//! │  ┌────────────┐   ┌────────────┐   ┌─────────────────────┐  │
//! │  │ Classifier │──▶│  Arbiter   │──▶│  Consensus Engine   │  │
//! │  │  (ONNX)    │   │  (Gemini)  │   │  (override/fallback)│  │
//! │  └────────────┘   └────────────┘   └──────────┬──────────┘  │
//! │                                               ▼             │
//! │  GET /history, GET /stats ──────────▶ ┌─────────────┐       │
//! │                                       │ Audit Store │       │
//! │                                       └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod arbiter;
mod classifier;
mod config;
mod consensus;
mod db;
mod error;
mod handlers;
mod models;
mod pipeline;
mod stats;
mod store;

#[cfg(test)]
mod testing;

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
    services::{ServeDir, ServeFile},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::arbiter::{Arbiter, GeminiArbiter};
use crate::classifier::UrlClassifier;
use crate::store::{MemoryScanStore, PgScanStore, ScanStore};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_logging(&config);

    tracing::info!("URL Arbiter starting...");

    let store = build_store(&config).await?;
    match store.ping().await {
        Ok(()) => tracing::info!("Audit store ({}) connection successful", store.backend()),
        Err(e) => tracing::warn!("Audit store ({}) connection failed: {}", store.backend(), e),
    }

    let classifier = classifier::load(&config);

    let arbiter = GeminiArbiter::new(config.arbiter())
        .context("failed to build arbiter HTTP client")?;
    if !arbiter.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set, verdicts will come from the local model only");
    }

    // Build application state
    let state = AppState {
        classifier,
        arbiter: Arc::new(arbiter),
        store,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_logging(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "url_arbiter=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &config::Config) -> anyhow::Result<Arc<dyn ScanStore>> {
    let Some(database_url) = &config.database_url else {
        if config.is_production() {
            tracing::error!("DATABASE_URL not set in production, scans are kept in memory only");
        } else {
            tracing::warn!("DATABASE_URL not set, scans are kept in memory only");
        }
        return Ok(Arc::new(MemoryScanStore::new()));
    };

    tracing::info!("Database: {}", database_url.split('@').last().unwrap_or("***"));

    let pool = db::create_pool(database_url, config.database_max_connections)
        .context("invalid DATABASE_URL")?;

    tracing::info!("Running database migrations...");
    if let Err(e) = db::run_migrations(&pool).await {
        tracing::warn!("Database migrations failed: {}", e);
    }

    Ok(Arc::new(PgScanStore::new(pool)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn UrlClassifier>,
    pub arbiter: Arc<dyn Arbiter>,
    pub store: Arc<dyn ScanStore>,
    pub config: Arc<config::Config>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/scan", post(handlers::scan::scan))
        .route("/history", get(handlers::history::list))
        .route("/stats", get(handlers::stats::get));

    // Front-end assets, when shipped
    let static_dir = &state.config.static_dir;
    if static_dir.is_dir() {
        router = router
            .route_service("/", ServeFile::new(static_dir.join("index.html")))
            .nest_service("/static", ServeDir::new(static_dir));
    } else {
        tracing::debug!("Static directory {} not found, UI disabled", static_dir.display());
    }

    router
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
