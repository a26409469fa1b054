use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSeverity {
    Minor,
    Moderate,
    Major,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub severity: GapSeverity,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub skills: f64,
    pub experience: f64,
    pub domain: f64,
    pub location: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Shortlisted,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Shortlisted => "shortlisted",
            MatchStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub score: f64,
    pub breakdown: Json<MatchBreakdown>,
    pub explanation: String,
    pub gaps: Json<Vec<Gap>>,
    pub status: String,
    pub calculated_at: DateTime<Utc>,
}

/// The output of the matching engine (C7) before it is upserted as a row —
/// `status` (shortlisted/rejected) is human state that a recompute must
/// never touch, so it deliberately has no place here (see DESIGN.md, Open
/// Question 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub score: f64,
    pub breakdown: MatchBreakdown,
    pub explanation: String,
    pub gaps: Vec<Gap>,
}
