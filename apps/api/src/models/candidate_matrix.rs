use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSkill {
    pub name: String,
    pub level: SkillLevel,
    pub years_of_experience: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub field: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocationSignals {
    pub current_country: Option<String>,
    #[serde(default)]
    pub willing_to_relocate: bool,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub field: String,
    pub snippet: String,
    pub source_page: Option<i32>,
}

/// The candidate matrix row. `skills`/`education`/`languages`/`evidence`/
/// `location_signals` are stored as JSON columns — they are nested
/// structured data produced wholesale by the LLM adapter (C2), never
/// queried field-by-field in SQL, so a JSON column beats a join table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateMatrixRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub cv_file_id: Uuid,
    pub skills: Json<Vec<CandidateSkill>>,
    pub roles: Vec<String>,
    pub total_years_experience: f64,
    pub domains: Vec<String>,
    pub education: Json<Vec<EducationEntry>>,
    pub languages: Vec<String>,
    pub location_signals: Json<LocationSignals>,
    pub confidence: f64,
    pub evidence: Json<Vec<Evidence>>,
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
}

/// Content of a candidate matrix without row identity — the shape the LLM
/// adapter (C2) produces and the matrix builder (C4) persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatrixContent {
    pub skills: Vec<CandidateSkill>,
    pub roles: Vec<String>,
    pub total_years_experience: f64,
    pub domains: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub languages: Vec<String>,
    pub location_signals: LocationSignals,
    pub confidence: f64,
    pub evidence: Vec<Evidence>,
}
