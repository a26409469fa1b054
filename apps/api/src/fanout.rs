//! Match Fan-Out (C8) — on a freshly-ready matrix, compute matches against
//! every already-ready counterpart (§4.8). Each (candidate, job) compute is
//! idempotent (upsert keyed by the unique pair); a failure on one pair is
//! logged and does not abort the rest (§7 "Propagation policy").

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::candidate_matrix;
use crate::candidates;
use crate::errors::AppError;
use crate::job_matrix;
use crate::jobs;
use crate::matches_repo;
use crate::models::candidate::Candidate;
use crate::models::candidate_matrix::CandidateMatrixRow;
use crate::models::job::Job;
use crate::models::job_matrix::JobMatrixRow;

const DEFAULT_FANOUT_CONCURRENCY: usize = 4;

/// Candidate matrix became ready -> match against every published job that
/// already has a matrix (§4.8, trigger 1).
pub async fn on_candidate_matrix_ready(pool: &PgPool, candidate_id: Uuid) -> Result<(), AppError> {
    on_candidate_matrix_ready_with_concurrency(pool, candidate_id, DEFAULT_FANOUT_CONCURRENCY).await
}

pub async fn on_candidate_matrix_ready_with_concurrency(
    pool: &PgPool,
    candidate_id: Uuid,
    concurrency: usize,
) -> Result<(), AppError> {
    let candidate = candidates::get(pool, candidate_id).await?;
    let matrix = candidate_matrix::current_for_candidate(pool, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("candidate {candidate_id} has no matrix")))?;

    let jobs = jobs::list_published_with_matrix(pool).await?;
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut set = tokio::task::JoinSet::new();

    for job in jobs {
        let pool = pool.clone();
        let candidate = candidate.clone();
        let matrix = matrix.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            match_one_job(&pool, &candidate, &matrix, job).await
        });
    }

    while let Some(joined) = set.join_next().await {
        if let Err(e) = joined {
            tracing::error!("fan-out task for candidate {candidate_id} panicked: {e}");
        }
    }

    Ok(())
}

async fn match_one_job(pool: &PgPool, candidate: &Candidate, matrix: &CandidateMatrixRow, job: Job) {
    let job_id = job.id;
    let job_matrix = match job_matrix::get_for_job(pool, job_id).await {
        Ok(Some(jm)) => jm,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("fan-out: failed to load job matrix for job {job_id}: {e}");
            return;
        }
    };
    if let Err(e) = matches_repo::compute_and_store(pool, candidate, matrix, &job, &job_matrix).await {
        tracing::error!(
            "fan-out: failed to compute match for candidate {} x job {job_id}: {e}",
            candidate.id
        );
    }
}

/// Job matrix became ready -> match against every candidate that already
/// has a matrix (§4.8, trigger 2).
pub async fn on_job_matrix_ready(pool: &PgPool, job_id: Uuid) -> Result<(), AppError> {
    on_job_matrix_ready_with_concurrency(pool, job_id, DEFAULT_FANOUT_CONCURRENCY).await
}

pub async fn on_job_matrix_ready_with_concurrency(pool: &PgPool, job_id: Uuid, concurrency: usize) -> Result<(), AppError> {
    let job = jobs::get(pool, job_id).await?;
    let job_matrix = job_matrix::get_for_job(pool, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} has no matrix")))?;

    let candidates = candidates::list_with_matrix(pool).await?;
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut set = tokio::task::JoinSet::new();

    for candidate in candidates {
        let pool = pool.clone();
        let job = job.clone();
        let job_matrix = job_matrix.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            match_one_candidate(&pool, candidate, &job, &job_matrix).await
        });
    }

    while let Some(joined) = set.join_next().await {
        if let Err(e) = joined {
            tracing::error!("fan-out task for job {job_id} panicked: {e}");
        }
    }

    Ok(())
}

async fn match_one_candidate(pool: &PgPool, candidate: Candidate, job: &Job, job_matrix: &JobMatrixRow) {
    let candidate_id = candidate.id;
    let matrix = match candidate_matrix::current_for_candidate(pool, candidate_id).await {
        Ok(Some(m)) => m,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("fan-out: failed to load candidate matrix for candidate {candidate_id}: {e}");
            return;
        }
    };
    if let Err(e) = matches_repo::compute_and_store(pool, &candidate, &matrix, job, job_matrix).await {
        tracing::error!("fan-out: failed to compute match for candidate {candidate_id} x job {}: {e}", job.id);
    }
}
