//! CvFile persistence slice of C10.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CvFile, CvFileStatus};

pub struct NewCvFile<'a> {
    pub candidate_id: Uuid,
    pub filename: &'a str,
    pub file_path: &'a str,
    pub file_size: i64,
    pub status: CvFileStatus,
    pub batch_tag: Option<&'a str>,
}

pub async fn insert(pool: &PgPool, new: NewCvFile<'_>) -> Result<CvFile, AppError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO cv_files (id, candidate_id, filename, file_path, file_size, status, batch_tag, uploaded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(new.candidate_id)
    .bind(new.filename)
    .bind(new.file_path)
    .bind(new.file_size)
    .bind(new.status.as_str())
    .bind(new.batch_tag)
    .bind(now)
    .execute(pool)
    .await
    .map_err(AppError::Database)?;

    Ok(CvFile {
        id,
        candidate_id: new.candidate_id,
        filename: new.filename.to_string(),
        file_path: new.file_path.to_string(),
        file_size: new.file_size,
        status: new.status.as_str().to_string(),
        batch_tag: new.batch_tag.map(String::from),
        uploaded_at: now,
        processed_at: None,
    })
}

pub async fn update_status(pool: &PgPool, id: Uuid, status: CvFileStatus) -> Result<(), AppError> {
    sqlx::query("UPDATE cv_files SET status = $1, processed_at = $2 WHERE id = $3")
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

/// Latest CvFile for a candidate — "latest wins for display" (§3).
pub async fn latest_for_candidate(pool: &PgPool, candidate_id: Uuid) -> Result<Option<CvFile>, AppError> {
    sqlx::query_as::<_, CvFile>(
        "SELECT * FROM cv_files WHERE candidate_id = $1 ORDER BY uploaded_at DESC LIMIT 1",
    )
    .bind(candidate_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Database)
}
