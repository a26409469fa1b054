//! Ingestion Pipeline (C6) — concurrency-limited batch upload of CVs.
//! Drives each file through the state machine in §4.6:
//!
//! `received -> disk_ok -> pdf_ok -> llm_extract_ok -> name_ok -> dedup_ok
//!  -> candidate_persisted -> cvfile_persisted -> scheduled_background -> done`
//!
//! A failure at any transition is isolated to that file (§5, §7
//! "Propagation policy") and reported with a `FailureStep` label.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::candidate_matrix;
use crate::candidates::{self, NewCandidate};
use crate::cv_files::{self, NewCvFile};
use crate::errors::AppError;
use crate::extraction;
use crate::fanout;
use crate::llm_client::{calls, LlmClient};
use crate::models::candidate::CvFileStatus;
use crate::name_validity;

/// The transition label a failure is reported against (§4.6, §9 "Error
/// carrying": "treat this as a small enum, not free-form text").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStep {
    DiskWrite,
    PdfExtraction,
    LlmExtract,
    NameValidation,
    Dedup,
    Persist,
}

impl FailureStep {
    pub fn label(self) -> &'static str {
        match self {
            FailureStep::DiskWrite => "Disk Write",
            FailureStep::PdfExtraction => "PDF Extraction",
            FailureStep::LlmExtract => "LLM Extract",
            FailureStep::NameValidation => "Name Validation",
            FailureStep::Dedup => "Dedup",
            FailureStep::Persist => "Persist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Success,
    Duplicate,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub filename: String,
    pub status: FileOutcome,
    pub error: Option<String>,
    pub failure_step: Option<&'static str>,
    pub candidate_id: Option<Uuid>,
}

/// Files grouped by identical error text, for the grouped failure summary
/// (§4.6: "files grouped by identical error text, then listed individually").
#[derive(Debug, Clone, Serialize)]
pub struct FailureGroup {
    pub error: String,
    pub filenames: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestionSummary {
    pub successful: usize,
    pub failed: usize,
    pub duplicates: usize,
    pub files: Vec<FileRecord>,
    pub failure_groups: Vec<FailureGroup>,
}

fn group_failures(records: &[FileRecord]) -> Vec<FailureGroup> {
    let mut groups: Vec<FailureGroup> = Vec::new();
    for record in records {
        if record.status != FileOutcome::Failed {
            continue;
        }
        let error = record.error.clone().unwrap_or_else(|| "unknown error".to_string());
        match groups.iter_mut().find(|g| g.error == error) {
            Some(group) => group.filenames.push(record.filename.clone()),
            None => groups.push(FailureGroup { error, filenames: vec![record.filename.clone()] }),
        }
    }
    groups
}

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Everything a single file's processing needs, shared read-only across
/// concurrent tasks.
#[derive(Clone)]
struct IngestContext {
    pool: PgPool,
    llm: LlmClient,
    storage_dir: PathBuf,
    batch_tag: Option<String>,
}

/// Processes a batch with bounded concurrency K (§4.6). Files are awaited
/// in parallel up to the semaphore's permits; one file's failure never
/// aborts another.
pub async fn run_batch(
    pool: &PgPool,
    llm: &LlmClient,
    storage_dir: &str,
    concurrency: usize,
    batch_tag: Option<String>,
    files: Vec<UploadedFile>,
) -> IngestionSummary {
    let ctx = IngestContext {
        pool: pool.clone(),
        llm: llm.clone(),
        storage_dir: PathBuf::from(storage_dir),
        batch_tag,
    };
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut set = tokio::task::JoinSet::new();
    for file in files {
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            process_one(ctx, file).await
        });
    }

    let mut records = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(record) => records.push(record),
            Err(join_err) => records.push(FileRecord {
                filename: "<unknown>".to_string(),
                status: FileOutcome::Failed,
                error: Some(format!("task panicked: {join_err}")),
                failure_step: None,
                candidate_id: None,
            }),
        }
    }

    let successful = records.iter().filter(|r| r.status == FileOutcome::Success).count();
    let duplicates = records.iter().filter(|r| r.status == FileOutcome::Duplicate).count();
    let failed = records.iter().filter(|r| r.status == FileOutcome::Failed).count();

    let failure_groups = group_failures(&records);
    for group in &failure_groups {
        tracing::warn!(
            "ingestion batch: {} file(s) failed with \"{}\": {:?}",
            group.filenames.len(),
            group.error,
            group.filenames
        );
    }

    IngestionSummary { successful, failed, duplicates, files: records, failure_groups }
}

async fn process_one(ctx: IngestContext, file: UploadedFile) -> FileRecord {
    let filename = file.filename.clone();
    match try_process_one(&ctx, file).await {
        Ok(record) => record,
        Err((step, err)) => FileRecord {
            filename,
            status: FileOutcome::Failed,
            error: Some(err),
            failure_step: step.map(FailureStep::label),
            candidate_id: None,
        },
    }
}

async fn try_process_one(ctx: &IngestContext, file: UploadedFile) -> Result<FileRecord, (Option<FailureStep>, String)> {
    let filename = file.filename.clone();

    // 1. Persist to disk, verify path exists and size > 0.
    if file.bytes.is_empty() {
        return Err((Some(FailureStep::DiskWrite), "uploaded file is empty".to_string()));
    }
    std::fs::create_dir_all(&ctx.storage_dir)
        .map_err(|e| (Some(FailureStep::DiskWrite), format!("could not create storage dir: {e}")))?;
    let unique_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(&filename));
    let disk_path = ctx.storage_dir.join(&unique_name);
    std::fs::write(&disk_path, &file.bytes)
        .map_err(|e| (Some(FailureStep::DiskWrite), format!("failed to write to disk: {e}")))?;
    let file_size = std::fs::metadata(&disk_path)
        .map_err(|e| (Some(FailureStep::DiskWrite), format!("could not stat written file: {e}")))?
        .len();
    if file_size == 0 {
        return Err((Some(FailureStep::DiskWrite), "written file has zero size".to_string()));
    }

    // 2. Extract PDF text (C1).
    let disk_path_clone = disk_path.clone();
    let cv_text = tokio::task::spawn_blocking(move || extraction::extract_from_pdf(&disk_path_clone))
        .await
        .map_err(|e| (Some(FailureStep::PdfExtraction), format!("extraction task panicked: {e}")))?
        .map_err(|e| (Some(FailureStep::PdfExtraction), e.to_string()))?;

    // 3. LLM extract candidate info (C2).
    let extracted = calls::extract_candidate_info(&ctx.llm, &cv_text)
        .await
        .map_err(|e| (Some(FailureStep::LlmExtract), e.to_string()))?;

    // 4. Validate name (§4.3), falling back to header extraction.
    let name = if name_validity::is_invalid_name(&extracted.name) {
        name_validity::extract_name_from_header(&cv_text)
            .ok_or_else(|| (Some(FailureStep::NameValidation), "could not recover a valid name".to_string()))?
    } else {
        extracted.name.clone()
    };

    // 5. Dedupe by email (case-insensitive); synthesize when absent.
    let (email, is_synthesized) = match &extracted.email {
        Some(e) if !e.trim().is_empty() => (e.trim().to_string(), false),
        _ => (candidates::slug_email(&name), true),
    };

    if !is_synthesized {
        if let Some(_existing) = candidates::find_by_email_ci(&ctx.pool, &email)
            .await
            .map_err(|e| (Some(FailureStep::Dedup), e.to_string()))?
        {
            return Ok(FileRecord {
                filename,
                status: FileOutcome::Duplicate,
                error: Some(format!("candidate with email {email} already exists")),
                failure_step: None,
                candidate_id: None,
            });
        }
    }

    // 6. Persist Candidate + CvFile.
    let candidate = candidates::insert(
        &ctx.pool,
        NewCandidate {
            name: &name,
            email: &email,
            phone: extracted.phone.as_deref(),
            country: extracted.country.as_deref(),
            headline: extracted.headline.as_deref(),
            roles: &[],
        },
    )
    .await
    .map_err(|e| match e {
        AppError::Conflict(msg) => (None, msg), // race-lost insert -> duplicate, no step label
        other => (Some(FailureStep::Persist), other.to_string()),
    })?;

    let cv_file = cv_files::insert(
        &ctx.pool,
        NewCvFile {
            candidate_id: candidate.id,
            filename: &filename,
            file_path: &disk_path.to_string_lossy(),
            file_size: file_size as i64,
            status: CvFileStatus::Uploaded,
            batch_tag: ctx.batch_tag.as_deref(),
        },
    )
    .await
    .map_err(|e| (Some(FailureStep::Persist), e.to_string()))?;

    // 7. Schedule background matrix build + fan-out; failures there never
    // propagate back to this HTTP response (§4.6 step 7, §5).
    let pool = ctx.pool.clone();
    let llm = ctx.llm.clone();
    let candidate_id = candidate.id;
    let cv_file_id = cv_file.id;
    tokio::spawn(async move {
        build_matrix_and_fanout(pool, llm, candidate_id, cv_file_id, cv_text).await;
    });

    Ok(FileRecord {
        filename,
        status: FileOutcome::Success,
        error: None,
        failure_step: None,
        candidate_id: Some(candidate.id),
    })
}

/// The detached background task per §4.6 step 7 / §5: runs C4 then, on
/// success, invokes C8. Its failure updates `CvFile.status` but is logged,
/// never surfaced to a caller.
pub async fn build_matrix_and_fanout(pool: PgPool, llm: LlmClient, candidate_id: Uuid, cv_file_id: Uuid, cv_text: String) {
    let _ = cv_files::update_status(&pool, cv_file_id, CvFileStatus::Parsing).await;

    match candidate_matrix::build_and_persist(&pool, &llm, candidate_id, cv_file_id, &cv_text).await {
        Ok(_matrix) => {
            if let Err(e) = cv_files::update_status(&pool, cv_file_id, CvFileStatus::MatrixReady).await {
                tracing::error!("failed to mark cv_file {cv_file_id} matrix_ready: {e}");
            }
            if let Err(e) = fanout::on_candidate_matrix_ready(&pool, candidate_id).await {
                tracing::error!("fan-out for candidate {candidate_id} failed: {e}");
            }
        }
        Err(e) => {
            tracing::warn!("matrix build failed for candidate {candidate_id}: {e}");
            let status = if matches!(e, AppError::LlmSchemaViolation(_)) {
                CvFileStatus::Failed
            } else {
                CvFileStatus::NeedsReview
            };
            let _ = cv_files::update_status(&pool, cv_file_id, status).await;
        }
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_unsafe_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), ".._.._etc_passwd.pdf");
    }

    #[test]
    fn test_failure_step_labels() {
        assert_eq!(FailureStep::NameValidation.label(), "Name Validation");
        assert_eq!(FailureStep::PdfExtraction.label(), "PDF Extraction");
    }
}
