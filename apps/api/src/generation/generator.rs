//! Generation tasks — the three LLM-backed artifacts produced for an application.
//!
//! The task set is closed: resume feedback, cover letter, interview questions.
//! `ApplicationGenerator` has exactly one operation per task. Every call
//! resolves to a value or a `GenerationFailure`; transport and parse errors are
//! converted at this boundary and never escape as anything else.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, INTERVIEW_QUESTIONS_PROMPT_TEMPLATE,
    INTERVIEW_QUESTIONS_SYSTEM, RESUME_FEEDBACK_PROMPT_TEMPLATE, RESUME_FEEDBACK_SYSTEM,
};
use crate::llm_client::prompts::{resume_and_jd, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{CallOptions, LlmClient, LlmError};

pub const DEFAULT_NUM_QUESTIONS: u32 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Task identity
// ────────────────────────────────────────────────────────────────────────────

/// One of the three generation tasks run for every application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenerationTask {
    ResumeFeedback,
    CoverLetter,
    InterviewQuestions,
}

impl GenerationTask {
    /// Key used in the record and in its `errors` map.
    pub fn key(self) -> &'static str {
        match self {
            GenerationTask::ResumeFeedback => "resumeFeedback",
            GenerationTask::CoverLetter => "coverLetter",
            GenerationTask::InterviewQuestions => "interviewQuestions",
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single task failed. Recovered by the aggregator, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct GenerationFailure {
    pub reason: String,
}

impl GenerationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new("timeout")
    }
}

impl From<LlmError> for GenerationFailure {
    fn from(err: LlmError) -> Self {
        Self::new(err.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inputs and outputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub resume: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[default]
    Technical,
    Behavioral,
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technical" => Ok(QuestionType::Technical),
            "behavioral" | "behavioural" => Ok(QuestionType::Behavioral),
            _ => Err(format!(
                "questionType must be Technical or Behavioral, got {s:?}"
            )),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Technical => f.write_str("Technical"),
            QuestionType::Behavioral => f.write_str("Behavioral"),
        }
    }
}

/// Resume feedback. Also the authoritative source of the company/position/location
/// fields on the application record, so every field tolerates being absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Normalized summary of the job description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_feedback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    #[serde(rename = "type")]
    pub question_type: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterviewQuestionsEnvelope {
    #[serde(default)]
    interview_questions: Vec<InterviewQuestion>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator trait
// ────────────────────────────────────────────────────────────────────────────

/// The three generation capabilities. Implementations must not write to storage.
///
/// Carried in `AppState` as `Arc<dyn ApplicationGenerator>`.
#[async_trait]
pub trait ApplicationGenerator: Send + Sync {
    async fn resume_feedback(
        &self,
        input: &GenerationInput,
    ) -> Result<ResumeFeedback, GenerationFailure>;

    async fn cover_letter(&self, input: &GenerationInput) -> Result<CoverLetter, GenerationFailure>;

    async fn interview_questions(
        &self,
        input: &GenerationInput,
        question_type: QuestionType,
        num_questions: u32,
    ) -> Result<Vec<InterviewQuestion>, GenerationFailure>;
}

/// Production generator backed by the shared `LlmClient`.
pub struct LlmGenerator {
    llm: LlmClient,
}

impl LlmGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ApplicationGenerator for LlmGenerator {
    async fn resume_feedback(
        &self,
        input: &GenerationInput,
    ) -> Result<ResumeFeedback, GenerationFailure> {
        let prompt = RESUME_FEEDBACK_PROMPT_TEMPLATE.replace(
            "{inputs}",
            &resume_and_jd(&input.resume, &input.job_description),
        );
        let system = json_system(RESUME_FEEDBACK_SYSTEM);
        let options = CallOptions {
            max_tokens: 750,
            temperature: 0.5,
        };
        Ok(self.llm.call_json(&prompt, &system, options).await?)
    }

    async fn cover_letter(&self, input: &GenerationInput) -> Result<CoverLetter, GenerationFailure> {
        let prompt = COVER_LETTER_PROMPT_TEMPLATE.replace(
            "{inputs}",
            &resume_and_jd(&input.resume, &input.job_description),
        );
        let system = json_system(COVER_LETTER_SYSTEM);
        let options = CallOptions {
            max_tokens: 1000,
            temperature: 0.5,
        };
        let letter: CoverLetter = self.llm.call_json(&prompt, &system, options).await?;
        check_cover_letter(letter)
    }

    async fn interview_questions(
        &self,
        input: &GenerationInput,
        question_type: QuestionType,
        num_questions: u32,
    ) -> Result<Vec<InterviewQuestion>, GenerationFailure> {
        let prompt = build_interview_prompt(input, question_type, num_questions);
        let system = json_system(INTERVIEW_QUESTIONS_SYSTEM);
        let options = CallOptions {
            max_tokens: 2000,
            temperature: 0.5,
        };
        let envelope: InterviewQuestionsEnvelope =
            self.llm.call_json(&prompt, &system, options).await?;
        check_interview_questions(envelope.interview_questions)
    }
}

fn json_system(base: &str) -> String {
    format!("{base} {JSON_ONLY_INSTRUCTION}")
}

fn build_interview_prompt(
    input: &GenerationInput,
    question_type: QuestionType,
    num_questions: u32,
) -> String {
    INTERVIEW_QUESTIONS_PROMPT_TEMPLATE
        .replace("{num_questions}", &num_questions.to_string())
        .replace("{question_type}", &question_type.to_string())
        .replace(
            "{inputs}",
            &resume_and_jd(&input.resume, &input.job_description),
        )
}

/// A cover letter without a body is not a result.
fn check_cover_letter(letter: CoverLetter) -> Result<CoverLetter, GenerationFailure> {
    let has_body = letter
        .cover_letter_body
        .as_deref()
        .is_some_and(|body| !body.trim().is_empty());
    if !has_body {
        return Err(GenerationFailure::new("cover letter response had no body"));
    }
    Ok(letter)
}

fn check_interview_questions(
    questions: Vec<InterviewQuestion>,
) -> Result<Vec<InterviewQuestion>, GenerationFailure> {
    if questions.is_empty() {
        return Err(GenerationFailure::new("no interview questions returned"));
    }
    Ok(questions)
}
