//! Job Matrix Builder (C5) — persistence slice plus orchestration over the
//! LLM Adapter (C2) that turns job title/description/explicit skills into a
//! stored, weighted `JobMatrixRow` (§4.5). 1:1 with `Job` (I4), so writes
//! are an upsert keyed by `job_id`.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{calls, LlmClient};
use crate::models::job_matrix::{JobMatrixContent, JobMatrixRow};

pub async fn upsert(
    pool: &PgPool,
    job_id: Uuid,
    content: JobMatrixContent,
    model_version: &str,
) -> Result<JobMatrixRow, AppError> {
    content
        .validate()
        .map_err(AppError::Validation)?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO job_matrices
            (id, job_id, required_skills, preferred_skills, experience_weight,
             location_weight, domain_weight, generated_at, model_version)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (job_id) DO UPDATE SET
            required_skills = EXCLUDED.required_skills,
            preferred_skills = EXCLUDED.preferred_skills,
            experience_weight = EXCLUDED.experience_weight,
            location_weight = EXCLUDED.location_weight,
            domain_weight = EXCLUDED.domain_weight,
            generated_at = EXCLUDED.generated_at,
            model_version = EXCLUDED.model_version
        "#,
    )
    .bind(id)
    .bind(job_id)
    .bind(Json(&content.required_skills))
    .bind(Json(&content.preferred_skills))
    .bind(content.experience_weight)
    .bind(content.location_weight)
    .bind(content.domain_weight)
    .bind(now)
    .bind(model_version)
    .execute(pool)
    .await
    .map_err(AppError::Database)?;

    get_for_job(pool, job_id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("job matrix upsert for {job_id} vanished")))
}

pub async fn get_for_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobMatrixRow>, AppError> {
    sqlx::query_as::<_, JobMatrixRow>("SELECT * FROM job_matrices WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
}

/// Manual edit path (`PUT /jobs/{id}/matrix`): caller already has validated
/// content, no LLM call needed.
pub async fn put_manual(pool: &PgPool, job_id: Uuid, content: JobMatrixContent) -> Result<JobMatrixRow, AppError> {
    upsert(pool, job_id, content, "manual-edit").await
}

/// §4.5 retry: on `LlmSchemaViolation`, retry the whole call once more; a
/// second failure propagates and the caller marks the Job `failed`.
pub async fn build_and_persist(
    pool: &PgPool,
    llm: &LlmClient,
    job_id: Uuid,
    title: &str,
    description: &str,
    must_have: &[String],
    nice_to_have: &[String],
) -> Result<JobMatrixRow, AppError> {
    let content = match calls::generate_job_matrix(llm, title, description, must_have, nice_to_have).await {
        Ok(content) => content,
        Err(AppError::LlmSchemaViolation(reason)) => {
            tracing::warn!("job matrix generation schema violation ({reason}), retrying once");
            calls::generate_job_matrix(llm, title, description, must_have, nice_to_have).await?
        }
        Err(other) => return Err(other),
    };
    upsert(pool, job_id, content, llm.model_version()).await
}
