pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::application::handlers as applications;
use crate::generation::handlers as generation;
use crate::state::AppState;
use crate::uploads;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Single-task generation (not persisted)
        .route(
            "/api/v1/applications/resume-feedback",
            post(generation::handle_resume_feedback),
        )
        .route(
            "/api/v1/applications/cover-letter",
            post(generation::handle_cover_letter),
        )
        .route(
            "/api/v1/applications/interview-questions",
            post(generation::handle_interview_questions),
        )
        // Per-user resume and applications
        .route(
            "/api/v1/users/:user_id/resume",
            post(uploads::handle_upload_resume).get(uploads::handle_download_resume),
        )
        .route(
            "/api/v1/users/:user_id/applications",
            post(applications::handle_process_application)
                .get(applications::handle_list_applications),
        )
        .route(
            "/api/v1/users/:user_id/applications/:app_id",
            get(applications::handle_get_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/v1/users/:user_id/applications/:app_id/cover-letter",
            get(applications::handle_get_cover_letter),
        )
        .route(
            "/api/v1/users/:user_id/applications/:app_id/interview-questions",
            get(applications::handle_get_interview_questions),
        )
        .route(
            "/api/v1/users/:user_id/applications/:app_id/status",
            patch(applications::handle_update_status),
        )
        .with_state(state)
}
