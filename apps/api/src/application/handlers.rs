//! Axum route handlers for the Applications API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::application::aggregator::ProcessRequest;
use crate::application::models::{ApplicationRecord, ApplicationStatus};
use crate::errors::{AppError, AppJson};
use crate::generation::generator::{CoverLetter, InterviewQuestion};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub application: ApplicationRecord,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/users/:user_id/applications
///
/// Runs the three generation tasks, builds the record and appends it to the
/// user's applications. Task failures degrade the record's status; only
/// orchestration or persistence failures fail the request.
pub async fn handle_process_application(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    AppJson(request): AppJson<ProcessRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    let application = state.aggregator.process(&user_id, request).await?;

    let saved = state.store.append_application(&user_id, &application).await?;
    if !saved {
        error!(
            "Application {} for user {} was built but not saved",
            application.id, user_id
        );
        return Err(AppError::Persistence(
            "Failed to save the application".to_string(),
        ));
    }

    Ok(Json(ProcessResponse {
        message: "Application processed".to_string(),
        application,
    }))
}

/// GET /api/v1/users/:user_id/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let applications = state.store.list_applications(&user_id).await?;
    if applications.is_empty() {
        return Err(AppError::NotFound("No applications found".to_string()));
    }
    Ok(Json(ApplicationListResponse { applications }))
}

/// GET /api/v1/users/:user_id/applications/:app_id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path((user_id, app_id)): Path<(String, Uuid)>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let application = find_application(&state, &user_id, app_id).await?;
    Ok(Json(application))
}

/// GET /api/v1/users/:user_id/applications/:app_id/cover-letter
pub async fn handle_get_cover_letter(
    State(state): State<AppState>,
    Path((user_id, app_id)): Path<(String, Uuid)>,
) -> Result<Json<CoverLetter>, AppError> {
    let application = find_application(&state, &user_id, app_id).await?;
    Ok(Json(application.cover_letter))
}

/// GET /api/v1/users/:user_id/applications/:app_id/interview-questions
pub async fn handle_get_interview_questions(
    State(state): State<AppState>,
    Path((user_id, app_id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<InterviewQuestion>>, AppError> {
    let application = find_application(&state, &user_id, app_id).await?;
    if application.interview_questions.is_empty() {
        return Err(AppError::NotFound(
            "No interview questions found".to_string(),
        ));
    }
    Ok(Json(application.interview_questions))
}

/// PATCH /api/v1/users/:user_id/applications/:app_id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path((user_id, app_id)): Path<(String, Uuid)>,
    AppJson(request): AppJson<StatusUpdateRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let label = request.status.trim();
    if label.is_empty() {
        return Err(AppError::Validation("Missing 'status' field".to_string()));
    }

    let status = ApplicationStatus::from(label.to_string());
    let updated = state.store.update_status(&user_id, app_id, &status).await?;
    if !updated {
        return Err(AppError::NotFound(format!("Application {app_id} not found")));
    }

    Ok(Json(MessageResponse {
        message: "Application status updated successfully".to_string(),
    }))
}

/// DELETE /api/v1/users/:user_id/applications/:app_id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path((user_id, app_id)): Path<(String, Uuid)>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state.store.delete_application(&user_id, app_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Application {app_id} not found")));
    }

    Ok(Json(MessageResponse {
        message: "Application deleted successfully".to_string(),
    }))
}

async fn find_application(
    state: &AppState,
    user_id: &str,
    app_id: Uuid,
) -> Result<ApplicationRecord, AppError> {
    state
        .store
        .get_application(user_id, app_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {app_id} not found")))
}
