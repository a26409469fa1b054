//! `/candidates/*`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::cv_files;
use crate::errors::AppError;
use crate::extraction;
use crate::ingestion;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct RerunMatchingRequest {
    #[serde(default)]
    pub regenerate_matrix: bool,
}

/// Schedules matrix regen (optional) + fan-out for one candidate (§6).
/// Runs in the background; failures are reflected via `CvFile.status`, not
/// this response, same as the ingestion pipeline's own background step.
pub async fn handle_rerun_matching(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    body: Option<Json<RerunMatchingRequest>>,
) -> Result<StatusCode, AppError> {
    let regenerate_matrix = body.map(|b| b.0.regenerate_matrix).unwrap_or(false);

    let cv_file = cv_files::latest_for_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("candidate {candidate_id} has no CV file")))?;

    let pool = state.db.clone();
    let llm = state.llm.clone();
    let cv_file_id = cv_file.id;

    if regenerate_matrix {
        let path = std::path::PathBuf::from(cv_file.file_path);
        let cv_text = tokio::task::spawn_blocking(move || extraction::extract_from_pdf(&path))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task panicked: {e}")))??;
        tokio::spawn(async move {
            ingestion::build_matrix_and_fanout(pool, llm, candidate_id, cv_file_id, cv_text).await;
        });
    } else {
        tokio::spawn(async move {
            if let Err(e) = crate::fanout::on_candidate_matrix_ready(&pool, candidate_id).await {
                tracing::error!("rerun-matching fan-out for candidate {candidate_id} failed: {e}");
            }
        });
    }

    Ok(StatusCode::ACCEPTED)
}
