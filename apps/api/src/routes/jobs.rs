//! `/jobs/*`.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction;
use crate::job_matrix;
use crate::jobs::{self, NewJob};
use crate::llm_client::calls;
use crate::models::job::{Job, JobStatus, LocationType, SeniorityLevel};
use crate::models::job_matrix::{JobMatrixContent, JobMatrixRow};
use crate::state::AppState;

fn parse_location_type(s: &str) -> Result<LocationType, AppError> {
    match s {
        "onsite" => Ok(LocationType::Onsite),
        "hybrid" => Ok(LocationType::Hybrid),
        "remote" => Ok(LocationType::Remote),
        other => Err(AppError::Validation(format!("invalid location_type '{other}'"))),
    }
}

fn parse_job_status(s: &str) -> Result<JobStatus, AppError> {
    match s {
        "draft" => Ok(JobStatus::Draft),
        "published" => Ok(JobStatus::Published),
        "closed" => Ok(JobStatus::Closed),
        other => Err(AppError::Validation(format!("invalid status '{other}'"))),
    }
}

/// Runs C5 then C8 in the background when a job is created/ends up
/// published; never surfaced to the HTTP caller (§5).
fn trigger_matrix_and_fanout(
    state: &AppState,
    job_id: Uuid,
    title: String,
    description: String,
    must_have: Vec<String>,
    nice_to_have: Vec<String>,
) {
    let pool = state.db.clone();
    let llm = state.llm.clone();
    tokio::spawn(async move {
        match job_matrix::build_and_persist(&pool, &llm, job_id, &title, &description, &must_have, &nice_to_have).await {
            Ok(_) => {
                if let Err(e) = crate::fanout::on_job_matrix_ready(&pool, job_id).await {
                    tracing::error!("fan-out for job {job_id} failed: {e}");
                }
            }
            Err(e) => tracing::warn!("matrix build failed for job {job_id}: {e}"),
        }
    });
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub company_id: Option<Uuid>,
    pub title: String,
    pub department: String,
    pub company: Option<String>,
    pub location_type: String,
    pub country: String,
    pub city: String,
    pub description: String,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    pub min_years_experience: f64,
    pub seniority_level: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_status() -> String {
    "draft".to_string()
}

pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<Job>, AppError> {
    let location_type = parse_location_type(&req.location_type)?;
    let status = parse_job_status(&req.status)?;
    let seniority_level = SeniorityLevel::parse(&req.seniority_level)
        .ok_or_else(|| AppError::Validation(format!("invalid seniority_level '{}'", req.seniority_level)))?;

    let job = jobs::insert(
        &state.db,
        NewJob {
            company_id: req.company_id,
            title: &req.title,
            department: &req.department,
            company: req.company.as_deref(),
            location_type,
            country: &req.country,
            city: &req.city,
            description: &req.description,
            must_have_skills: &req.must_have_skills,
            nice_to_have_skills: &req.nice_to_have_skills,
            min_years_experience: req.min_years_experience,
            seniority_level,
            status,
            deadline: req.deadline,
        },
    )
    .await?;

    if status == JobStatus::Published {
        trigger_matrix_and_fanout(
            &state,
            job.id,
            job.title.clone(),
            job.description.clone(),
            job.must_have_skills.clone(),
            job.nice_to_have_skills.clone(),
        );
    }

    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
pub struct FromUrlRequest {
    pub url: String,
    #[serde(default = "default_status")]
    pub status: String,
}

pub async fn handle_from_url(
    State(state): State<AppState>,
    Json(req): Json<FromUrlRequest>,
) -> Result<Json<Job>, AppError> {
    let status = parse_job_status(&req.status)?;
    let posting_text = extraction::fetch_and_extract_html(&req.url).await?;
    let extracted = calls::extract_job_info_from_posting(&state.llm, &posting_text).await?;
    create_from_extracted(&state, extracted, status).await
}

pub async fn handle_from_pdf(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<Job>, AppError> {
    let mut status = JobStatus::Draft;
    let mut pdf_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "status" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid status field: {e}")))?;
                status = parse_job_status(&text)?;
            }
            "file" => {
                pdf_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("failed to read upload body: {e}")))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let bytes = pdf_bytes.ok_or_else(|| AppError::Validation("no file in upload".to_string()))?;
    let tmp_path = std::env::temp_dir().join(format!("job-posting-{}.pdf", Uuid::new_v4()));
    std::fs::write(&tmp_path, &bytes).map_err(|e| AppError::Internal(anyhow::anyhow!("failed to buffer upload: {e}")))?;
    let extraction_path = tmp_path.clone();
    let posting_text = tokio::task::spawn_blocking(move || extraction::extract_from_pdf(&extraction_path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task panicked: {e}")))??;
    let _ = std::fs::remove_file(&tmp_path);

    let extracted = calls::extract_job_info_from_posting(&state.llm, &posting_text).await?;
    create_from_extracted(&state, extracted, status).await
}

async fn create_from_extracted(
    state: &AppState,
    extracted: calls::ExtractedJobInfo,
    status: JobStatus,
) -> Result<Json<Job>, AppError> {
    let job = jobs::insert(
        &state.db,
        NewJob {
            company_id: None,
            title: &extracted.title,
            department: &extracted.department,
            company: extracted.company.as_deref(),
            location_type: extracted.location_type,
            country: &extracted.country,
            city: &extracted.city,
            description: &extracted.description,
            must_have_skills: &extracted.must_have_skills,
            nice_to_have_skills: &extracted.nice_to_have_skills,
            min_years_experience: extracted.min_years_experience,
            seniority_level: extracted.seniority_level,
            status,
            deadline: None,
        },
    )
    .await?;

    if status == JobStatus::Published {
        trigger_matrix_and_fanout(
            state,
            job.id,
            job.title.clone(),
            job.description.clone(),
            job.must_have_skills.clone(),
            job.nice_to_have_skills.clone(),
        );
    }

    Ok(Json(job))
}

pub async fn handle_get_matrix(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobMatrixRow>, AppError> {
    job_matrix::get_for_job(&state.db, job_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} has no matrix")))
}

pub async fn handle_put_matrix(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(content): Json<JobMatrixContent>,
) -> Result<Json<JobMatrixRow>, AppError> {
    let matrix = job_matrix::put_manual(&state.db, job_id, content).await?;
    if let Err(e) = crate::fanout::on_job_matrix_ready(&state.db, job_id).await {
        tracing::error!("fan-out after manual matrix edit for job {job_id} failed: {e}");
    }
    Ok(Json(matrix))
}

pub async fn handle_regen_matrix(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobMatrixRow>, AppError> {
    let job = jobs::get(&state.db, job_id).await?;
    let matrix = job_matrix::build_and_persist(
        &state.db,
        &state.llm,
        job_id,
        &job.title,
        &job.description,
        &job.must_have_skills,
        &job.nice_to_have_skills,
    )
    .await?;
    if let Err(e) = crate::fanout::on_job_matrix_ready(&state.db, job_id).await {
        tracing::error!("fan-out after matrix regen for job {job_id} failed: {e}");
    }
    Ok(Json(matrix))
}
