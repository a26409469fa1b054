use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub headline: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvFile {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub status: String,
    pub batch_tag: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// `CvFile.status` — kept as a `String` column (see `CvFileStatus::as_str`)
/// so ad-hoc SQL filters (`WHERE status = $1`) stay simple; the typed enum
/// is the boundary every Rust caller actually works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvFileStatus {
    Uploaded,
    Parsing,
    MatrixReady,
    NeedsReview,
    Failed,
}

impl CvFileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CvFileStatus::Uploaded => "uploaded",
            CvFileStatus::Parsing => "parsing",
            CvFileStatus::MatrixReady => "matrix_ready",
            CvFileStatus::NeedsReview => "needs_review",
            CvFileStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CvFileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
