mod bulk;
mod candidate_matrix;
mod candidates;
mod config;
mod cv_files;
mod db;
mod errors;
mod extraction;
mod fanout;
mod ingestion;
mod job_matrix;
mod jobs;
mod llm_client;
mod matches_repo;
mod matching;
mod models;
mod name_validity;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bulk::Orchestrator;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

/// Boot-time exit codes (§6): 0 graceful shutdown, 64 config invalid, 70
/// store unreachable at startup. Anything past config load and DB connect
/// is a running server, so later failures fall back to the default `?`
/// unwind (exit code 1) rather than one of these two reserved codes.
const EXIT_CONFIG_INVALID: i32 = 64;
const EXIT_STORE_UNREACHABLE: i32 = 70;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e:?}");
            std::process::exit(EXIT_CONFIG_INVALID);
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting matching API v{}", env!("CARGO_PKG_VERSION"));

    let db = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("store unreachable at startup: {e:?}");
            std::process::exit(EXIT_STORE_UNREACHABLE);
        }
    };
    if let Err(e) = db::run_migrations(&db).await {
        tracing::error!("store unreachable at startup (migrations failed): {e:?}");
        std::process::exit(EXIT_STORE_UNREACHABLE);
    }

    let llm = LlmClient::with_concurrency(
        config.anthropic_api_key.clone(),
        config.llm_model_version.clone(),
        config.llm_timeout_seconds,
        config.llm_max_concurrency,
    );
    info!("LLM client initialized (model: {})", config.llm_model_version);

    std::fs::create_dir_all(&config.cv_storage_dir)?;

    let state = AppState {
        db,
        llm,
        config: config.clone(),
        bulk: Orchestrator::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
