//! Axum route handlers that run a single generation task on its own.
//! Nothing is persisted; the full pipeline lives in `application::handlers`.

use std::future::Future;
use std::time::Duration;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::application::aggregator::ProcessRequest;
use crate::errors::{AppError, AppJson};
use crate::generation::generator::{
    CoverLetter, GenerationFailure, GenerationTask, InterviewQuestion, ResumeFeedback,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResumeFeedbackResponse {
    pub feedback: ResumeFeedback,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: CoverLetter,
}

#[derive(Debug, Serialize)]
pub struct InterviewQuestionsResponse {
    pub questions: Vec<InterviewQuestion>,
}

/// POST /api/v1/applications/resume-feedback
pub async fn handle_resume_feedback(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProcessRequest>,
) -> Result<Json<ResumeFeedbackResponse>, AppError> {
    let request = request.validate()?;
    let feedback = run_single(
        GenerationTask::ResumeFeedback,
        state.config.generation_timeout,
        state.generator.resume_feedback(&request.input),
    )
    .await?;
    Ok(Json(ResumeFeedbackResponse { feedback }))
}

/// POST /api/v1/applications/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProcessRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let request = request.validate()?;
    let cover_letter = run_single(
        GenerationTask::CoverLetter,
        state.config.generation_timeout,
        state.generator.cover_letter(&request.input),
    )
    .await?;
    Ok(Json(CoverLetterResponse { cover_letter }))
}

/// POST /api/v1/applications/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProcessRequest>,
) -> Result<Json<InterviewQuestionsResponse>, AppError> {
    let request = request.validate()?;
    let questions = run_single(
        GenerationTask::InterviewQuestions,
        state.config.generation_timeout,
        state.generator.interview_questions(
            &request.input,
            request.question_type,
            request.num_questions,
        ),
    )
    .await?;
    Ok(Json(InterviewQuestionsResponse { questions }))
}

/// Runs one task under the configured timeout. Here a failure is the whole
/// response, so it surfaces as an LLM error rather than a partial record.
async fn run_single<T>(
    task: GenerationTask,
    limit: Duration,
    work: impl Future<Output = Result<T, GenerationFailure>>,
) -> Result<T, AppError> {
    let outcome = tokio::time::timeout(limit, work)
        .await
        .unwrap_or_else(|_| Err(GenerationFailure::timeout()));
    outcome.map_err(|failure| AppError::Llm(format!("{task} generation failed: {failure}")))
}
