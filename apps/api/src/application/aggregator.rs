//! Application processing — runs the three generation tasks concurrently and
//! assembles one `ApplicationRecord`.
//!
//! Flow: validate → spawn resume feedback, cover letter, interview questions →
//!       wait for all three (each under its own timeout) → build_application.
//!
//! A task failure, timeout or panic is recorded in that task's slot only. The
//! other two results are always captured. Dropping the returned future aborts
//! any task still in flight.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use crate::application::builder::{build_application, TaskResults};
use crate::application::models::{ApplicationRecord, TaskErrors};
use crate::generation::generator::{
    ApplicationGenerator, GenerationFailure, GenerationInput, GenerationTask, QuestionType,
    DEFAULT_NUM_QUESTIONS,
};

#[derive(Debug, Error)]
pub enum ProcessError {
    /// Missing or empty input. No task was dispatched.
    #[error("Validation failure: {0}")]
    Validation(String),

    /// The concurrency mechanism itself failed. No partial record exists.
    #[error("Orchestration failure: {0}")]
    Orchestration(String),
}

/// Request body for processing an application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(default, rename = "userResume")]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
    /// Parsed case-insensitively by `validate`.
    #[serde(default)]
    pub question_type: Option<String>,
    /// Signed so negative counts reach `validate` instead of failing extraction.
    #[serde(default)]
    pub num_questions: Option<i64>,
}

pub(crate) struct ValidatedRequest {
    pub(crate) input: GenerationInput,
    pub(crate) question_type: QuestionType,
    pub(crate) num_questions: u32,
}

impl ProcessRequest {
    pub(crate) fn validate(self) -> Result<ValidatedRequest, ProcessError> {
        if self.resume.trim().is_empty() {
            return Err(ProcessError::Validation(
                "userResume cannot be empty".to_string(),
            ));
        }
        if self.job_description.trim().is_empty() {
            return Err(ProcessError::Validation(
                "jobDescription cannot be empty".to_string(),
            ));
        }
        let num_questions = match self.num_questions {
            None => DEFAULT_NUM_QUESTIONS,
            Some(n) => u32::try_from(n)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ProcessError::Validation("numQuestions must be a positive integer".to_string())
                })?,
        };
        let question_type = match self.question_type.as_deref() {
            None => QuestionType::default(),
            Some(raw) => raw.parse().map_err(ProcessError::Validation)?,
        };

        Ok(ValidatedRequest {
            input: GenerationInput {
                resume: self.resume,
                job_description: self.job_description,
            },
            question_type,
            num_questions,
        })
    }
}

/// Runs the generation fan-out for one application.
#[derive(Clone)]
pub struct Aggregator {
    generator: Arc<dyn ApplicationGenerator>,
    task_timeout: Duration,
}

impl Aggregator {
    pub fn new(generator: Arc<dyn ApplicationGenerator>, task_timeout: Duration) -> Self {
        Self {
            generator,
            task_timeout,
        }
    }

    /// Processes one application. `user_id` identifies whose record is built;
    /// persisting it is left to the caller.
    pub async fn process(
        &self,
        user_id: &str,
        request: ProcessRequest,
    ) -> Result<ApplicationRecord, ProcessError> {
        let (results, errors) = self.run_tasks(request).await?;
        let record = build_application(results, errors);

        info!(
            "Built application {} for user {} with status {}",
            record.id, user_id, record.status
        );
        Ok(record)
    }

    /// Runs all three tasks and collects each outcome into its own slot.
    pub async fn run_tasks(
        &self,
        request: ProcessRequest,
    ) -> Result<(TaskResults, TaskErrors), ProcessError> {
        let request = request.validate()?;
        let input = Arc::new(request.input);

        let feedback = {
            let (generator, input) = (self.generator.clone(), input.clone());
            self.spawn_task(GenerationTask::ResumeFeedback, async move {
                generator.resume_feedback(&input).await
            })
        };
        let cover_letter = {
            let (generator, input) = (self.generator.clone(), input.clone());
            self.spawn_task(GenerationTask::CoverLetter, async move {
                generator.cover_letter(&input).await
            })
        };
        let questions = {
            let (generator, input) = (self.generator.clone(), input.clone());
            let (question_type, num_questions) = (request.question_type, request.num_questions);
            self.spawn_task(GenerationTask::InterviewQuestions, async move {
                generator
                    .interview_questions(&input, question_type, num_questions)
                    .await
            })
        };

        let (feedback, cover_letter, questions) =
            tokio::join!(feedback.settle(), cover_letter.settle(), questions.settle());

        let mut results = TaskResults::default();
        let mut errors = TaskErrors::new();

        if let Some(value) = record_outcome(GenerationTask::ResumeFeedback, feedback?, &mut errors) {
            results.resume_feedback = value;
        }
        if let Some(value) = record_outcome(GenerationTask::CoverLetter, cover_letter?, &mut errors)
        {
            results.cover_letter = value;
        }
        if let Some(value) =
            record_outcome(GenerationTask::InterviewQuestions, questions?, &mut errors)
        {
            results.interview_questions = value;
        }

        Ok((results, errors))
    }

    fn spawn_task<T, F>(&self, task: GenerationTask, work: F) -> TaskSlot<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, GenerationFailure>> + Send + 'static,
    {
        let limit = self.task_timeout;
        let handle = tokio::spawn(async move {
            match tokio::time::timeout(limit, work).await {
                Ok(outcome) => outcome,
                Err(_) => Err(GenerationFailure::timeout()),
            }
        });
        TaskSlot { task, handle }
    }
}

fn record_outcome<T>(
    task: GenerationTask,
    outcome: Result<T, GenerationFailure>,
    errors: &mut TaskErrors,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(failure) => {
            warn!("Generation task {task} failed: {failure}");
            errors.insert(task.key().to_string(), failure.reason);
            None
        }
    }
}

/// A spawned task bound to one result slot. Aborts the task when dropped.
struct TaskSlot<T> {
    task: GenerationTask,
    handle: JoinHandle<Result<T, GenerationFailure>>,
}

impl<T> TaskSlot<T> {
    /// Waits for the task to finish. A panic is that task's failure; a task
    /// cancelled out from under us means the runtime itself gave up.
    async fn settle(mut self) -> Result<Result<T, GenerationFailure>, ProcessError> {
        match (&mut self.handle).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => settle_join_error(self.task, err),
        }
    }
}

impl<T> Drop for TaskSlot<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn settle_join_error<T>(
    task: GenerationTask,
    err: JoinError,
) -> Result<Result<T, GenerationFailure>, ProcessError> {
    if err.is_panic() {
        let message = panic_message(err.into_panic());
        return Ok(Err(GenerationFailure::new(format!(
            "task panicked: {message}"
        ))));
    }
    Err(ProcessError::Orchestration(format!(
        "{task} was cancelled before completing"
    )))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
