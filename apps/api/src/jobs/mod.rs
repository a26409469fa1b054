//! Job persistence slice of C10.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobStatus, LocationType, SeniorityLevel};

pub struct NewJob<'a> {
    pub company_id: Option<Uuid>,
    pub title: &'a str,
    pub department: &'a str,
    pub company: Option<&'a str>,
    pub location_type: LocationType,
    pub country: &'a str,
    pub city: &'a str,
    pub description: &'a str,
    pub must_have_skills: &'a [String],
    pub nice_to_have_skills: &'a [String],
    pub min_years_experience: f64,
    pub seniority_level: SeniorityLevel,
    pub status: JobStatus,
    pub deadline: Option<chrono::DateTime<Utc>>,
}

pub async fn insert(pool: &PgPool, new: NewJob<'_>) -> Result<Job, AppError> {
    if new.description.chars().count() < 50 {
        return Err(AppError::Validation(
            "description must be at least 50 characters".to_string(),
        ));
    }
    if !(0.0..=20.0).contains(&new.min_years_experience) {
        return Err(AppError::Validation(
            "min_years_experience must be in [0, 20]".to_string(),
        ));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO jobs
            (id, company_id, title, department, company, location_type, country, city,
             description, must_have_skills, nice_to_have_skills, min_years_experience,
             seniority_level, status, deadline, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(id)
    .bind(new.company_id)
    .bind(new.title)
    .bind(new.department)
    .bind(new.company)
    .bind(new.location_type.as_str())
    .bind(new.country)
    .bind(new.city)
    .bind(new.description)
    .bind(new.must_have_skills)
    .bind(new.nice_to_have_skills)
    .bind(new.min_years_experience)
    .bind(new.seniority_level.as_str())
    .bind(new.status.as_str())
    .bind(new.deadline)
    .bind(now)
    .execute(pool)
    .await
    .map_err(AppError::Database)?;

    get(pool, id).await
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Job, AppError> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("job {id} not found")))
}

/// Published jobs that already have a matrix — the pool C8's
/// candidate-matrix-ready fan-out and C9's `rerun-matching` sweep over.
pub async fn list_published_with_matrix(pool: &PgPool) -> Result<Vec<Job>, AppError> {
    sqlx::query_as::<_, Job>(
        r#"
        SELECT j.* FROM jobs j
        WHERE j.status = 'published'
          AND EXISTS (SELECT 1 FROM job_matrices m WHERE m.job_id = j.id)
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(AppError::Database)
}
