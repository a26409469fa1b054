//! The four logical LLM calls the core depends on (C2 §4.2). Each enforces
//! its strict JSON schema through `LlmClient::call_json`, which already
//! re-asks once on a parse failure; a second failure surfaces here as
//! `AppError::LlmSchemaViolation`.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::{prompts, LlmClient, LlmError};
use crate::models::candidate_matrix::CandidateMatrixContent;
use crate::models::job::{LocationType, SeniorityLevel};
use crate::models::job_matrix::JobMatrixContent;

fn map_err(context: &str, err: LlmError) -> AppError {
    match err {
        LlmError::SchemaViolation(reason) => {
            AppError::LlmSchemaViolation(format!("{context}: {reason}"))
        }
        other => AppError::LlmUnavailable(format!("{context}: {other}")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedCandidateInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub headline: Option<String>,
}

pub async fn extract_candidate_info(
    llm: &LlmClient,
    cv_text: &str,
) -> Result<ExtractedCandidateInfo, AppError> {
    let prompt = prompts::EXTRACT_CANDIDATE_INFO_TEMPLATE.replace("{cv_text}", cv_text);
    llm.call_json(&prompt, prompts::EXTRACT_CANDIDATE_INFO_SYSTEM)
        .await
        .map_err(|e| map_err("extract_candidate_info", e))
}

pub async fn generate_candidate_matrix(
    llm: &LlmClient,
    cv_text: &str,
) -> Result<CandidateMatrixContent, AppError> {
    let prompt = prompts::GENERATE_CANDIDATE_MATRIX_TEMPLATE.replace("{cv_text}", cv_text);
    llm.call_json(&prompt, prompts::GENERATE_CANDIDATE_MATRIX_SYSTEM)
        .await
        .map_err(|e| map_err("generate_candidate_matrix", e))
}

pub async fn generate_job_matrix(
    llm: &LlmClient,
    title: &str,
    description: &str,
    must_have: &[String],
    nice_to_have: &[String],
) -> Result<JobMatrixContent, AppError> {
    let prompt = prompts::GENERATE_JOB_MATRIX_TEMPLATE
        .replace("{title}", title)
        .replace("{description}", description)
        .replace("{must_have}", &must_have.join(", "))
        .replace("{nice_to_have}", &nice_to_have.join(", "));

    let content: JobMatrixContent = llm
        .call_json(&prompt, prompts::GENERATE_JOB_MATRIX_SYSTEM)
        .await
        .map_err(|e| map_err("generate_job_matrix", e))?;

    content
        .validate()
        .map_err(|reason| AppError::LlmSchemaViolation(format!("generate_job_matrix: {reason}")))?;

    Ok(content)
}

#[derive(Debug, Clone, Deserialize)]
struct ExtractedJobInfoRaw {
    title: String,
    department: Option<String>,
    company: Option<String>,
    location_type: String,
    country_code: String,
    city: String,
    description: String,
    must_have_skills: Vec<String>,
    nice_to_have_skills: Vec<String>,
    min_years_experience: f64,
    seniority_level: String,
}

#[derive(Debug, Clone)]
pub struct ExtractedJobInfo {
    pub title: String,
    pub department: String,
    pub company: Option<String>,
    pub location_type: LocationType,
    pub country: String,
    pub city: String,
    pub description: String,
    pub must_have_skills: Vec<String>,
    pub nice_to_have_skills: Vec<String>,
    pub min_years_experience: f64,
    pub seniority_level: SeniorityLevel,
}

pub async fn extract_job_info_from_posting(
    llm: &LlmClient,
    posting_text: &str,
) -> Result<ExtractedJobInfo, AppError> {
    let prompt = prompts::EXTRACT_JOB_INFO_TEMPLATE.replace("{posting_text}", posting_text);
    let raw: ExtractedJobInfoRaw = llm
        .call_json(&prompt, prompts::EXTRACT_JOB_INFO_SYSTEM)
        .await
        .map_err(|e| map_err("extract_job_info_from_posting", e))?;

    let location_type = match raw.location_type.as_str() {
        "remote" => LocationType::Remote,
        "hybrid" => LocationType::Hybrid,
        "onsite" => LocationType::Onsite,
        other => {
            return Err(AppError::LlmSchemaViolation(format!(
                "extract_job_info_from_posting: invalid location_type '{other}'"
            )))
        }
    };

    let seniority_level = SeniorityLevel::parse(&raw.seniority_level).ok_or_else(|| {
        AppError::LlmSchemaViolation(format!(
            "extract_job_info_from_posting: invalid seniority_level '{}'",
            raw.seniority_level
        ))
    })?;

    Ok(ExtractedJobInfo {
        title: raw.title,
        department: raw.department.unwrap_or_else(|| "General".to_string()),
        company: raw.company,
        location_type,
        country: raw.country_code,
        city: raw.city,
        description: raw.description,
        must_have_skills: raw.must_have_skills,
        nice_to_have_skills: raw.nice_to_have_skills,
        min_years_experience: raw.min_years_experience,
        seniority_level,
    })
}
