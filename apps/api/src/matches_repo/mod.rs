//! Match persistence slice of C10, plus the glue that turns stored rows
//! into the matching engine's (C7) borrowed-profile inputs.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::{self, CandidateProfile, JobProfile};
use crate::models::candidate::Candidate;
use crate::models::candidate_matrix::CandidateMatrixRow;
use crate::models::job::Job;
use crate::models::job_matrix::JobMatrixRow;
use crate::models::match_record::{MatchOutcome, MatchRow};

/// Upserts a match outcome keyed by the unique `(candidate_id, job_id)`
/// pair (I5). `status` (shortlisted/rejected) is deliberately untouched on
/// conflict — a recompute only ever refreshes score/breakdown/explanation/
/// gaps/calculated_at (DESIGN.md, Open Question 2).
pub async fn upsert(pool: &PgPool, candidate_id: Uuid, job_id: Uuid, outcome: &MatchOutcome) -> Result<MatchRow, AppError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO matches (id, candidate_id, job_id, score, breakdown, explanation, gaps, status, calculated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
        ON CONFLICT (candidate_id, job_id) DO UPDATE SET
            score = EXCLUDED.score,
            breakdown = EXCLUDED.breakdown,
            explanation = EXCLUDED.explanation,
            gaps = EXCLUDED.gaps,
            calculated_at = EXCLUDED.calculated_at
        "#,
    )
    .bind(id)
    .bind(candidate_id)
    .bind(job_id)
    .bind(outcome.score)
    .bind(Json(&outcome.breakdown))
    .bind(&outcome.explanation)
    .bind(Json(&outcome.gaps))
    .bind(now)
    .execute(pool)
    .await
    .map_err(AppError::Database)?;

    sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE candidate_id = $1 AND job_id = $2")
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("match upsert for ({candidate_id}, {job_id}) vanished")))
}

/// Runs the matching engine (C7) for one (candidate, job) pair and upserts
/// the result. Returns `Ok(None)` when the pre-filter rejects the pair —
/// not every pass through the fan-out produces a row.
pub async fn compute_and_store(
    pool: &PgPool,
    candidate: &Candidate,
    candidate_matrix: &CandidateMatrixRow,
    job: &Job,
    job_matrix: &JobMatrixRow,
) -> Result<Option<MatchRow>, AppError> {
    let candidate_profile = CandidateProfile {
        headline: candidate.headline.as_deref(),
        roles: &candidate.roles,
        country: candidate.country.as_deref(),
        skills: &candidate_matrix.skills.0,
        domains: &candidate_matrix.domains,
        total_years_experience: candidate_matrix.total_years_experience,
        location: &candidate_matrix.location_signals.0,
    };
    let job_profile = JobProfile {
        title: &job.title,
        department: Some(job.department.as_str()),
        description: &job.description,
        country: Some(job.country.as_str()),
        location_type: job.location_type(),
        min_years_experience: job.min_years_experience,
        seniority_level: job.seniority_level(),
        required_skills: &job_matrix.required_skills.0,
        preferred_skills: &job_matrix.preferred_skills.0,
        experience_weight: job_matrix.experience_weight,
        location_weight: job_matrix.location_weight,
        domain_weight: job_matrix.domain_weight,
    };

    if !matching::should_consider(&candidate_profile, &job_profile) {
        return Ok(None);
    }

    let result = matching::calculate_match_score(&candidate_profile, &job_profile);
    let outcome = MatchOutcome {
        score: result.score,
        breakdown: result.breakdown,
        explanation: result.explanation,
        gaps: result.gaps,
    };
    upsert(pool, candidate.id, job.id, &outcome).await.map(Some)
}
