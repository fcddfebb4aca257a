pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::session::handlers as session;
use crate::state::AppState;

/// Resume uploads larger than this are rejected before extraction.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/providers", get(analysis::handle_list_providers))
        .route("/api/v1/tasks", get(analysis::handle_list_tasks))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(session::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/sessions/:id/job-description",
            put(session::handle_set_job_description),
        )
        .route(
            "/api/v1/sessions/:id/language",
            put(session::handle_set_language),
        )
        .route("/api/v1/sessions/:id/scores", get(session::handle_get_scores))
        .route("/api/v1/sessions/:id/skills", get(session::handle_get_skills))
        // Analysis
        .route(
            "/api/v1/sessions/:id/analyze",
            post(analysis::handle_analyze),
        )
        .with_state(state)
}
