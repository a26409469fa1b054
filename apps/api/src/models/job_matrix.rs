use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedSkill {
    pub skill: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobMatrixRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub required_skills: Json<Vec<WeightedSkill>>,
    pub preferred_skills: Json<Vec<WeightedSkill>>,
    pub experience_weight: i32,
    pub location_weight: i32,
    pub domain_weight: i32,
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
}

impl JobMatrixRow {
    /// `skills_weight = 100 − experience − location − domain` (I4: must be > 0).
    pub fn skills_weight(&self) -> i32 {
        100 - self.experience_weight - self.location_weight - self.domain_weight
    }
}

/// Content of a job matrix without row identity, as produced by
/// `generate_job_matrix` (C2) and validated by the job matrix builder (C5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatrixContent {
    pub required_skills: Vec<WeightedSkill>,
    pub preferred_skills: Vec<WeightedSkill>,
    pub experience_weight: i32,
    pub location_weight: i32,
    pub domain_weight: i32,
}

impl JobMatrixContent {
    pub fn skills_weight(&self) -> i32 {
        100 - self.experience_weight - self.location_weight - self.domain_weight
    }

    /// Enforces I4: `skills_weight > 0`.
    pub fn validate(&self) -> Result<(), String> {
        if self.skills_weight() <= 0 {
            return Err(format!(
                "skills_weight must be > 0, got {} (experience={}, location={}, domain={})",
                self.skills_weight(),
                self.experience_weight,
                self.location_weight,
                self.domain_weight
            ));
        }
        Ok(())
    }
}
