mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod llm_client;
mod pipeline;
mod redaction;
mod routes;
mod state;
mod store;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::pipeline::audit::ContentAuditor;
use crate::redaction::Redactor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::FsJobStore;
use crate::tracking::PgUsageSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV-boost API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (LLM usage tracking)
    let pool = create_pool(&config.database_url).await?;
    let usage = Arc::new(PgUsageSink::new(pool));

    // Initialize the pending-job store
    let jobs = Arc::new(FsJobStore::new(&config.storage_dir));
    info!("Pending-job store at {}/tmp_jobs", config.storage_dir);

    // Initialize LLM client
    let llm = LlmClient::new(&config);
    info!("LLM client initialized (model: {})", llm.model());

    // Build app state
    let state = AppState {
        llm,
        jobs,
        usage,
        redactor: Redactor::new(),
        auditor: ContentAuditor::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
