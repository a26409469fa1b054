//! Candidate Matrix Builder (C4) — persistence slice plus the thin
//! orchestration over the Text Extractor (C1) and LLM Adapter (C2) that
//! turns CV text into a stored `CandidateMatrixRow` (§4.5).

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{calls, LlmClient};
use crate::models::candidate_matrix::{CandidateMatrixContent, CandidateMatrixRow};

pub async fn insert_new(
    pool: &PgPool,
    candidate_id: Uuid,
    cv_file_id: Uuid,
    content: CandidateMatrixContent,
    model_version: &str,
) -> Result<CandidateMatrixRow, AppError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO candidate_matrices
            (id, candidate_id, cv_file_id, skills, roles, total_years_experience,
             domains, education, languages, location_signals, confidence, evidence,
             generated_at, model_version)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(id)
    .bind(candidate_id)
    .bind(cv_file_id)
    .bind(Json(&content.skills))
    .bind(&content.roles)
    .bind(content.total_years_experience)
    .bind(&content.domains)
    .bind(Json(&content.education))
    .bind(&content.languages)
    .bind(Json(&content.location_signals))
    .bind(content.confidence)
    .bind(Json(&content.evidence))
    .bind(now)
    .bind(model_version)
    .execute(pool)
    .await
    .map_err(AppError::Database)?;

    Ok(CandidateMatrixRow {
        id,
        candidate_id,
        cv_file_id,
        skills: Json(content.skills),
        roles: content.roles,
        total_years_experience: content.total_years_experience,
        domains: content.domains,
        education: Json(content.education),
        languages: content.languages,
        location_signals: Json(content.location_signals),
        confidence: content.confidence,
        evidence: Json(content.evidence),
        generated_at: now,
        model_version: model_version.to_string(),
    })
}

/// The authoritative matrix for a candidate (I3: newest wins).
pub async fn current_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Option<CandidateMatrixRow>, AppError> {
    sqlx::query_as::<_, CandidateMatrixRow>(
        "SELECT * FROM candidate_matrices WHERE candidate_id = $1 ORDER BY generated_at DESC LIMIT 1",
    )
    .bind(candidate_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Database)
}

/// Runs C1 (by delegation — caller already has CV text) through C2's
/// `generate_candidate_matrix`, then persists as a new current matrix row
/// (§4.5: "update the authoritative matrix in place (same row)" is
/// satisfied by inserting a new row and always querying the newest — I3).
///
/// §4.5 retry: on `LlmSchemaViolation` (distinct from `call_json`'s own
/// single re-ask inside the adapter), this builder retries the whole call
/// once more; a second failure propagates and the caller marks the CV
/// `failed`.
pub async fn build_and_persist(
    pool: &PgPool,
    llm: &LlmClient,
    candidate_id: Uuid,
    cv_file_id: Uuid,
    cv_text: &str,
) -> Result<CandidateMatrixRow, AppError> {
    let content = match calls::generate_candidate_matrix(llm, cv_text).await {
        Ok(content) => content,
        Err(AppError::LlmSchemaViolation(reason)) => {
            tracing::warn!("candidate matrix generation schema violation ({reason}), retrying once");
            calls::generate_candidate_matrix(llm, cv_text).await?
        }
        Err(other) => return Err(other),
    };
    insert_new(pool, candidate_id, cv_file_id, content, llm.model_version()).await
}
