use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing (boot exits with
/// code 64, see `main.rs`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,

    pub anthropic_api_key: String,
    pub llm_model_version: String,
    pub llm_timeout_seconds: u64,
    pub llm_max_concurrency: usize,

    pub upload_concurrency: usize,
    pub fanout_concurrency: usize,
    pub bulk_concurrency_llm: usize,
    pub bulk_concurrency_matrix_only: usize,
    pub bulk_job_retention_seconds: u64,
    pub cv_storage_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: env_or("PORT", "8080")
                .parse()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),

            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model_version: env_or("LLM_MODEL_VERSION", "matching-llm-2024-01"),
            llm_timeout_seconds: env_or("LLM_TIMEOUT_SECONDS", "60")
                .parse()
                .context("LLM_TIMEOUT_SECONDS must be an integer")?,
            llm_max_concurrency: env_or("LLM_MAX_CONCURRENCY", "8")
                .parse()
                .context("LLM_MAX_CONCURRENCY must be an integer")?,

            upload_concurrency: env_or("UPLOAD_CONCURRENCY", "10")
                .parse()
                .context("UPLOAD_CONCURRENCY must be an integer")?,
            fanout_concurrency: env_or("FANOUT_CONCURRENCY", "4")
                .parse()
                .context("FANOUT_CONCURRENCY must be an integer")?,
            bulk_concurrency_llm: env_or("BULK_CONCURRENCY_LLM", "1")
                .parse()
                .context("BULK_CONCURRENCY_LLM must be an integer")?,
            bulk_concurrency_matrix_only: env_or("BULK_CONCURRENCY_MATRIX_ONLY", "4")
                .parse()
                .context("BULK_CONCURRENCY_MATRIX_ONLY must be an integer")?,
            bulk_job_retention_seconds: env_or("BULK_JOB_RETENTION_SECONDS", "3600")
                .parse()
                .context("BULK_JOB_RETENTION_SECONDS must be an integer")?,
            cv_storage_dir: env_or("CV_STORAGE_DIR", "./data/cvs"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
