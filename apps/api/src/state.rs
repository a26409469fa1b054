use sqlx::PgPool;

use crate::bulk::Orchestrator;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub config: Config,
    /// In-process registry of bulk sweeps (C9) — lives for the process
    /// lifetime, independent of any one HTTP request.
    pub bulk: Orchestrator,
}
