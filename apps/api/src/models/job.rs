use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Onsite,
    Hybrid,
    Remote,
}

impl LocationType {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Onsite => "onsite",
            LocationType::Hybrid => "hybrid",
            LocationType::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityLevel {
    Junior,
    Mid,
    Senior,
    Lead,
    Principal,
}

impl SeniorityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SeniorityLevel::Junior => "junior",
            SeniorityLevel::Mid => "mid",
            SeniorityLevel::Senior => "senior",
            SeniorityLevel::Lead => "lead",
            SeniorityLevel::Principal => "principal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "junior" => Some(SeniorityLevel::Junior),
            "mid" => Some(SeniorityLevel::Mid),
            "senior" => Some(SeniorityLevel::Senior),
            "lead" => Some(SeniorityLevel::Lead),
            "principal" => Some(SeniorityLevel::Principal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Published => "published",
            JobStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub title: String,
    pub department: String,
    pub company: Option<String>,
    pub location_type: String,
    pub country: String,
    pub city: String,
    pub description: String,
    pub must_have_skills: Vec<String>,
    pub nice_to_have_skills: Vec<String>,
    pub min_years_experience: f64,
    pub seniority_level: String,
    pub status: String,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn location_type(&self) -> LocationType {
        match self.location_type.as_str() {
            "remote" => LocationType::Remote,
            "hybrid" => LocationType::Hybrid,
            _ => LocationType::Onsite,
        }
    }

    pub fn seniority_level(&self) -> SeniorityLevel {
        SeniorityLevel::parse(&self.seniority_level).unwrap_or(SeniorityLevel::Mid)
    }

    pub fn status(&self) -> JobStatus {
        match self.status.as_str() {
            "published" => JobStatus::Published,
            "closed" => JobStatus::Closed,
            _ => JobStatus::Draft,
        }
    }
}
