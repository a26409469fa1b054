use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulkJobType {
    RegenerateMatrices,
    RerunMatching,
    RegenerateAndMatch,
}

impl BulkJobType {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkJobType::RegenerateMatrices => "regenerate-matrices",
            BulkJobType::RerunMatching => "rerun-matching",
            BulkJobType::RegenerateAndMatch => "regenerate-and-match",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkJobStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl BulkJobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BulkJobStatus::Running)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkJobError {
    pub target_id: Uuid,
    pub name: String,
    pub error: String,
}

/// Snapshot returned by the status endpoint. The live, mutable counterpart
/// lives behind a mutex in the orchestrator (`bulk::orchestrator`); this is
/// the point-in-time copy handed back over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkJobSnapshot {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub job_type: BulkJobType,
    pub status: BulkJobStatus,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BulkJobError>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub current_target: Option<String>,
    pub only_missing: bool,
}
