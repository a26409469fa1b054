//! Bulk Orchestrator (C9) — tracked, cancellable background sweeps across
//! the whole candidate/job corpus (§4.9). One orchestrator per process,
//! holding an in-process registry keyed by `job_id` (§9 "Global state").
//!
//! Each `BulkJob` owns a worker group with its own concurrency (LLM-heavy
//! steps default to 1, matrix-only steps to 4, §5). Progress counters and
//! the error list live behind a per-job mutex; the registry map itself
//! lives behind its own mutex, so contention never crosses job boundaries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::{Mutex, Semaphore};
use uuid::Uuid;

use crate::candidate_matrix;
use crate::candidates;
use crate::cv_files;
use crate::errors::AppError;
use crate::extraction;
use crate::fanout;
use crate::llm_client::LlmClient;
use crate::models::bulk_job::{BulkJobError, BulkJobSnapshot, BulkJobStatus, BulkJobType};

struct JobState {
    job_type: BulkJobType,
    status: BulkJobStatus,
    total: usize,
    processed: usize,
    succeeded: usize,
    failed: usize,
    errors: Vec<BulkJobError>,
    started_at: chrono::DateTime<Utc>,
    completed_at: Option<chrono::DateTime<Utc>>,
    current_target: Option<String>,
    only_missing: bool,
}

impl JobState {
    fn snapshot(&self, id: Uuid) -> BulkJobSnapshot {
        BulkJobSnapshot {
            id,
            job_type: self.job_type,
            status: self.status,
            total: self.total,
            processed: self.processed,
            succeeded: self.succeeded,
            failed: self.failed,
            errors: self.errors.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
            current_target: self.current_target.clone(),
            only_missing: self.only_missing,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status == BulkJobStatus::Cancelled
    }
}

/// A single job's live state plus the mutex protecting it — cloned cheaply
/// (it's an `Arc`) so dispatched worker tasks can each hold a handle.
type SharedJobState = Arc<Mutex<JobState>>;

#[derive(Clone, Default)]
pub struct Orchestrator {
    jobs: Arc<Mutex<HashMap<Uuid, SharedJobState>>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a bulk job. Returns `Conflict` if another job of the same
    /// type is already running (§4.9: "Only one terminal bulk job per type
    /// may exist; submitting another while one is running returns
    /// Conflict").
    pub async fn start(
        &self,
        pool: PgPool,
        llm: LlmClient,
        job_type: BulkJobType,
        only_missing: bool,
        bulk_concurrency_llm: usize,
        bulk_concurrency_matrix_only: usize,
        retention: Duration,
    ) -> Result<Uuid, AppError> {
        {
            let jobs = self.jobs.lock().await;
            for state in jobs.values() {
                let state = state.lock().await;
                if state.job_type == job_type && state.status == BulkJobStatus::Running {
                    return Err(AppError::Conflict(format!(
                        "a {} bulk job is already running",
                        job_type.as_str()
                    )));
                }
            }
        }

        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let state = Arc::new(Mutex::new(JobState {
            job_type,
            status: BulkJobStatus::Running,
            total: 0,
            processed: 0,
            succeeded: 0,
            failed: 0,
            errors: Vec::new(),
            started_at,
            completed_at: None,
            current_target: None,
            only_missing,
        }));

        self.jobs.lock().await.insert(id, state.clone());
        persist_row(&pool, id, &state.lock().await, job_type, only_missing, started_at).await;

        let concurrency = match job_type {
            BulkJobType::RerunMatching => bulk_concurrency_matrix_only,
            BulkJobType::RegenerateMatrices | BulkJobType::RegenerateAndMatch => bulk_concurrency_llm,
        };

        let registry = self.jobs.clone();
        tokio::spawn(run_job(pool, llm, id, state, job_type, only_missing, concurrency, registry, retention));

        Ok(id)
    }

    /// Cancels a running job (§4.9). Cooperative: in-flight tasks finish
    /// and still count toward `processed`; no new task starts after this
    /// returns.
    pub async fn cancel(&self, job_id: Uuid) -> Result<BulkJobSnapshot, AppError> {
        let state = {
            let jobs = self.jobs.lock().await;
            jobs.get(&job_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("bulk job {job_id} not found (or retired)")))?
        };
        let mut inner = state.lock().await;
        if !inner.status.is_terminal() {
            inner.status = BulkJobStatus::Cancelled;
            inner.completed_at = Some(Utc::now());
        }
        Ok(inner.snapshot(job_id))
    }

    pub async fn snapshot(&self, pool: &PgPool, job_id: Uuid) -> Result<BulkJobSnapshot, AppError> {
        if let Some(state) = self.jobs.lock().await.get(&job_id).cloned() {
            return Ok(state.lock().await.snapshot(job_id));
        }
        snapshot_from_db(pool, job_id).await
    }

    pub async fn list_active(&self) -> Vec<BulkJobSnapshot> {
        let jobs = self.jobs.lock().await;
        let mut out = Vec::with_capacity(jobs.len());
        for (id, state) in jobs.iter() {
            out.push(state.lock().await.snapshot(*id));
        }
        out
    }
}

async fn snapshot_from_db(pool: &PgPool, job_id: Uuid) -> Result<BulkJobSnapshot, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        job_type: String,
        status: String,
        total: i64,
        processed: i64,
        succeeded: i64,
        failed: i64,
        errors: Json<Vec<BulkJobError>>,
        started_at: chrono::DateTime<Utc>,
        completed_at: Option<chrono::DateTime<Utc>>,
        current_target: Option<String>,
        only_missing: bool,
    }

    let row: Row = sqlx::query_as(
        r#"SELECT job_type, status, total, processed, succeeded, failed, errors,
                  started_at, completed_at, current_target, only_missing
           FROM bulk_jobs WHERE id = $1"#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::NotFound(format!("bulk job {job_id} not found")))?;

    let job_type = match row.job_type.as_str() {
        "regenerate-matrices" => BulkJobType::RegenerateMatrices,
        "rerun-matching" => BulkJobType::RerunMatching,
        _ => BulkJobType::RegenerateAndMatch,
    };
    let status = match row.status.as_str() {
        "running" => BulkJobStatus::Running,
        "failed" => BulkJobStatus::Failed,
        "cancelled" => BulkJobStatus::Cancelled,
        _ => BulkJobStatus::Completed,
    };

    Ok(BulkJobSnapshot {
        id: job_id,
        job_type,
        status,
        total: row.total as usize,
        processed: row.processed as usize,
        succeeded: row.succeeded as usize,
        failed: row.failed as usize,
        errors: row.errors.0,
        started_at: row.started_at,
        completed_at: row.completed_at,
        current_target: row.current_target,
        only_missing: row.only_missing,
    })
}

async fn persist_row(
    pool: &PgPool,
    id: Uuid,
    state: &JobState,
    job_type: BulkJobType,
    only_missing: bool,
    started_at: chrono::DateTime<Utc>,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO bulk_jobs (id, job_type, status, total, processed, succeeded, failed, errors, started_at, only_missing)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(job_type.as_str())
    .bind(bulk_status_str(state.status))
    .bind(state.total as i64)
    .bind(state.processed as i64)
    .bind(state.succeeded as i64)
    .bind(state.failed as i64)
    .bind(Json(&state.errors))
    .bind(started_at)
    .bind(only_missing)
    .execute(pool)
    .await;
    if let Err(e) = result {
        tracing::error!("failed to persist bulk job {id} row: {e}");
    }
}

async fn update_row(pool: &PgPool, id: Uuid, state: &JobState) {
    let result = sqlx::query(
        r#"
        UPDATE bulk_jobs SET status = $1, total = $2, processed = $3, succeeded = $4,
               failed = $5, errors = $6, completed_at = $7, current_target = $8
        WHERE id = $9
        "#,
    )
    .bind(bulk_status_str(state.status))
    .bind(state.total as i64)
    .bind(state.processed as i64)
    .bind(state.succeeded as i64)
    .bind(state.failed as i64)
    .bind(Json(&state.errors))
    .bind(state.completed_at)
    .bind(&state.current_target)
    .bind(id)
    .execute(pool)
    .await;
    if let Err(e) = result {
        tracing::error!("failed to update bulk job {id} row: {e}");
    }
}

fn bulk_status_str(status: BulkJobStatus) -> &'static str {
    match status {
        BulkJobStatus::Running => "running",
        BulkJobStatus::Completed => "completed",
        BulkJobStatus::Failed => "failed",
        BulkJobStatus::Cancelled => "cancelled",
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_job(
    pool: PgPool,
    llm: LlmClient,
    id: Uuid,
    state: SharedJobState,
    job_type: BulkJobType,
    only_missing: bool,
    concurrency: usize,
    registry: Arc<Mutex<HashMap<Uuid, SharedJobState>>>,
    retention: Duration,
) {
    // Rerun-matching only makes sense for candidates that already have a
    // matrix to fan out from (§4.9 item 2); `only_missing` governs step 1
    // of regenerate-and-match, not which candidates get matched in step 2.
    let phase1_enumeration = match job_type {
        BulkJobType::RerunMatching => candidates::list_with_matrix(&pool).await,
        BulkJobType::RegenerateMatrices | BulkJobType::RegenerateAndMatch => {
            candidates::list_for_bulk(&pool, only_missing).await
        }
    };
    let phase1_targets = match phase1_enumeration {
        Ok(c) => c,
        Err(e) => {
            let mut inner = state.lock().await;
            inner.status = BulkJobStatus::Failed;
            inner.completed_at = Some(Utc::now());
            inner.errors.push(BulkJobError {
                target_id: Uuid::nil(),
                name: "<batch>".to_string(),
                error: format!("failed to enumerate targets: {e}"),
            });
            update_row(&pool, id, &inner).await;
            drop(inner);
            schedule_retention(registry, id, retention);
            return;
        }
    };

    {
        let mut inner = state.lock().await;
        inner.total = phase1_targets.len();
        update_row(&pool, id, &inner).await;
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let phase1 = match job_type {
        BulkJobType::RegenerateMatrices | BulkJobType::RegenerateAndMatch => Phase::Regenerate,
        BulkJobType::RerunMatching => Phase::Fanout,
    };
    run_phase(&pool, &llm, &state, &semaphore, phase1_targets, phase1).await;

    // `regenerate-and-match` is "sequence of 1 then 2 per candidate" (§4.9
    // item 3), but step 2 (rerun-matching) is itself defined over *every*
    // candidate with a current matrix (§4.9 item 2), not only the ones
    // step 1 just touched — the open-question decision in DESIGN.md. Run
    // it as its own phase, re-enumerated after step 1 has written any new
    // matrices, rather than fanning out only the candidates from `targets`.
    if job_type == BulkJobType::RegenerateAndMatch && !state.lock().await.is_cancelled() {
        match candidates::list_with_matrix(&pool).await {
            Ok(phase2_targets) => {
                {
                    let mut inner = state.lock().await;
                    inner.total += phase2_targets.len();
                    update_row(&pool, id, &inner).await;
                }
                run_phase(&pool, &llm, &state, &semaphore, phase2_targets, Phase::Fanout).await;
            }
            Err(e) => {
                let mut inner = state.lock().await;
                inner.errors.push(BulkJobError {
                    target_id: Uuid::nil(),
                    name: "<batch>".to_string(),
                    error: format!("failed to enumerate rerun-matching targets: {e}"),
                });
                update_row(&pool, id, &inner).await;
            }
        }
    }

    {
        let mut inner = state.lock().await;
        if !inner.is_cancelled() {
            inner.status = if inner.failed > 0 && inner.succeeded == 0 && inner.total > 0 {
                BulkJobStatus::Failed
            } else {
                BulkJobStatus::Completed
            };
            inner.completed_at = Some(Utc::now());
        }
        inner.current_target = None;
        update_row(&pool, id, &inner).await;
    }

    schedule_retention(registry, id, retention);
}

fn schedule_retention(registry: Arc<Mutex<HashMap<Uuid, SharedJobState>>>, id: Uuid, retention: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(retention).await;
        registry.lock().await.remove(&id);
    });
}

/// One step of a bulk job's work, run per candidate. `RegenerateAndMatch`
/// is modelled as two sequential `run_phase` calls (regenerate, then
/// fan-out) rather than one combined per-candidate step, so that the
/// fan-out phase can be re-enumerated over the whole matrix-bearing
/// population (§4.9, DESIGN.md open-question decision 3).
#[derive(Clone, Copy)]
enum Phase {
    Regenerate,
    Fanout,
}

async fn run_phase(
    pool: &PgPool,
    llm: &LlmClient,
    state: &SharedJobState,
    semaphore: &Arc<Semaphore>,
    targets: Vec<crate::models::candidate::Candidate>,
    phase: Phase,
) {
    let mut set = tokio::task::JoinSet::new();

    for candidate in targets {
        // Cooperative cancellation check before each suspension point (§5).
        if state.lock().await.is_cancelled() {
            break;
        }

        let permit = semaphore.clone().acquire_owned().await.expect("semaphore closed");
        let pool = pool.clone();
        let llm = llm.clone();
        let state = state.clone();

        set.spawn(async move {
            let _permit = permit;
            let outcome = match phase {
                Phase::Regenerate => regenerate_matrix(&pool, &llm, candidate.id).await,
                Phase::Fanout => fanout::on_candidate_matrix_ready_with_concurrency(&pool, candidate.id, 1).await,
            };
            record_outcome(&state, candidate.id, &candidate.name, outcome).await;
        });
    }

    while let Some(joined) = set.join_next().await {
        if let Err(e) = joined {
            tracing::error!("bulk job worker task panicked: {e}");
        }
    }
}

async fn regenerate_matrix(pool: &PgPool, llm: &LlmClient, candidate_id: Uuid) -> Result<(), AppError> {
    let cv_file = cv_files::latest_for_candidate(pool, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("candidate {candidate_id} has no CV file")))?;

    let path = std::path::PathBuf::from(&cv_file.file_path);
    let cv_text = tokio::task::spawn_blocking(move || extraction::extract_from_pdf(&path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task panicked: {e}")))??;

    candidate_matrix::build_and_persist(pool, llm, candidate_id, cv_file.id, &cv_text).await?;
    Ok(())
}

async fn record_outcome(state: &SharedJobState, target_id: Uuid, name: &str, outcome: Result<(), AppError>) {
    let mut inner = state.lock().await;
    inner.processed += 1;
    inner.current_target = Some(name.to_string());
    match outcome {
        Ok(()) => inner.succeeded += 1,
        Err(e) => {
            inner.failed += 1;
            inner.errors.push(BulkJobError {
                target_id,
                name: name.to_string(),
                error: e.to_string(),
            });
        }
    }
}
