//! `/bulk-operations/*` — C9's HTTP surface.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::bulk_job::{BulkJobSnapshot, BulkJobType};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct StartBulkJobRequest {
    #[serde(default)]
    pub only_missing: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct StartBulkJobResponse {
    pub job_id: Uuid,
}

async fn start(state: &AppState, job_type: BulkJobType, only_missing: bool) -> Result<Json<StartBulkJobResponse>, AppError> {
    let retention = Duration::from_secs(state.config.bulk_job_retention_seconds);
    let job_id = state
        .bulk
        .start(
            state.db.clone(),
            state.llm.clone(),
            job_type,
            only_missing,
            state.config.bulk_concurrency_llm,
            state.config.bulk_concurrency_matrix_only,
            retention,
        )
        .await?;
    Ok(Json(StartBulkJobResponse { job_id }))
}

pub async fn handle_regenerate_matrices(
    State(state): State<AppState>,
    body: Option<Json<StartBulkJobRequest>>,
) -> Result<Json<StartBulkJobResponse>, AppError> {
    let only_missing = body.map(|b| b.0.only_missing).unwrap_or(false);
    start(&state, BulkJobType::RegenerateMatrices, only_missing).await
}

pub async fn handle_rerun_matching(State(state): State<AppState>) -> Result<Json<StartBulkJobResponse>, AppError> {
    start(&state, BulkJobType::RerunMatching, false).await
}

pub async fn handle_regenerate_and_match(
    State(state): State<AppState>,
    body: Option<Json<StartBulkJobRequest>>,
) -> Result<Json<StartBulkJobResponse>, AppError> {
    let only_missing = body.map(|b| b.0.only_missing).unwrap_or(false);
    start(&state, BulkJobType::RegenerateAndMatch, only_missing).await
}

pub async fn handle_get(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<BulkJobSnapshot>, AppError> {
    Ok(Json(state.bulk.snapshot(&state.db, job_id).await?))
}

pub async fn handle_list(State(state): State<AppState>) -> Json<Vec<BulkJobSnapshot>> {
    Json(state.bulk.list_active().await)
}

pub async fn handle_cancel(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<BulkJobSnapshot>, AppError> {
    Ok(Json(state.bulk.cancel(job_id).await?))
}
