pub mod bulk;
pub mod candidates;
pub mod cvs;
pub mod health;
pub mod jobs;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/cvs/upload", post(cvs::handle_upload))
        .route("/candidates/:id/rerun-matching", post(candidates::handle_rerun_matching))
        .route("/jobs", post(jobs::handle_create))
        .route("/jobs/from-url", post(jobs::handle_from_url))
        .route("/jobs/from-pdf", post(jobs::handle_from_pdf))
        .route(
            "/jobs/:id/matrix",
            get(jobs::handle_get_matrix)
                .put(jobs::handle_put_matrix)
                .post(jobs::handle_regen_matrix),
        )
        .route("/bulk-operations", get(bulk::handle_list))
        .route("/bulk-operations/regenerate-matrices", post(bulk::handle_regenerate_matrices))
        .route("/bulk-operations/rerun-matching", post(bulk::handle_rerun_matching))
        .route("/bulk-operations/regenerate-and-match", post(bulk::handle_regenerate_and_match))
        .route("/bulk-operations/:job_id", get(bulk::handle_get))
        .route("/bulk-operations/:job_id/cancel", post(bulk::handle_cancel))
        .with_state(state)
}
