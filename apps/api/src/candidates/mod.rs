//! Candidate persistence slice of C10. Owns the uniqueness constraint on
//! `LOWER(email)` (I1) and the cascade-delete entry point for a candidate's
//! dependent rows (cv_files, candidate_matrices, matches — all `ON DELETE
//! CASCADE` at the schema level, see `migrations/0001_init.sql`).

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{is_unique_violation, AppError};
use crate::models::candidate::Candidate;

pub struct NewCandidate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub country: Option<&'a str>,
    pub headline: Option<&'a str>,
    pub roles: &'a [String],
}

/// Inserts a candidate. A race-lost unique-email insert is reported as
/// `Conflict` rather than `Internal` (§4.6 step 6: "race-safe").
pub async fn insert(pool: &PgPool, new: NewCandidate<'_>) -> Result<Candidate, AppError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO candidates (id, name, email, phone, country, headline, roles, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(new.name)
    .bind(new.email.to_lowercase())
    .bind(new.phone)
    .bind(new.country)
    .bind(new.headline)
    .bind(new.roles)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("a candidate with email {} already exists", new.email))
        } else {
            AppError::Database(e)
        }
    })?;

    Ok(Candidate {
        id,
        name: new.name.to_string(),
        email: new.email.to_lowercase(),
        phone: new.phone.map(String::from),
        country: new.country.map(String::from),
        headline: new.headline.map(String::from),
        roles: new.roles.to_vec(),
        created_at: now,
    })
}

/// Dedup lookup for C6 step 5: `LOWER(email)` equality.
pub async fn find_by_email_ci(pool: &PgPool, email: &str) -> Result<Option<Candidate>, AppError> {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Candidate, AppError> {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("candidate {id} not found")))
}

/// All candidates that currently have a matrix — the pool C8's job-ready
/// fan-out and C9's `rerun-matching` sweep over.
pub async fn list_with_matrix(pool: &PgPool) -> Result<Vec<Candidate>, AppError> {
    sqlx::query_as::<_, Candidate>(
        r#"
        SELECT c.* FROM candidates c
        WHERE EXISTS (SELECT 1 FROM candidate_matrices m WHERE m.candidate_id = c.id)
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(AppError::Database)
}

/// All candidates, optionally restricted to those lacking a current matrix
/// (`only_missing`, used by C9's `regenerate-matrices`).
pub async fn list_for_bulk(pool: &PgPool, only_missing: bool) -> Result<Vec<Candidate>, AppError> {
    let query = if only_missing {
        r#"
        SELECT c.* FROM candidates c
        WHERE NOT EXISTS (SELECT 1 FROM candidate_matrices m WHERE m.candidate_id = c.id)
        ORDER BY c.created_at
        "#
    } else {
        "SELECT * FROM candidates ORDER BY created_at"
    };
    sqlx::query_as::<_, Candidate>(query)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
}

pub fn slug_email(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let collapsed = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("{collapsed}@example.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_email() {
        assert_eq!(slug_email("Jane Doe"), "jane-doe@example.com");
        assert_eq!(slug_email("  O'Brien  "), "o-brien@example.com");
    }
}
