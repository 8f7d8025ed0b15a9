use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::generator::{CoverLetter, InterviewQuestion, ResumeFeedback};

/// Task key → human-readable failure reason.
pub type TaskErrors = BTreeMap<String, String>;

/// Lifecycle status of an application.
///
/// The first three are set when the record is built. `Custom` carries labels a
/// user assigns afterwards through the status-update route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Submitted,
    PartialFailure,
    Failure,
    Custom(String),
}

impl From<String> for ApplicationStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Submitted" => ApplicationStatus::Submitted,
            "PartialFailure" => ApplicationStatus::PartialFailure,
            "Failure" => ApplicationStatus::Failure,
            _ => ApplicationStatus::Custom(label),
        }
    }
}

impl From<ApplicationStatus> for String {
    fn from(status: ApplicationStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::Submitted => f.write_str("Submitted"),
            ApplicationStatus::PartialFailure => f.write_str("PartialFailure"),
            ApplicationStatus::Failure => f.write_str("Failure"),
            ApplicationStatus::Custom(label) => f.write_str(label),
        }
    }
}

/// One processed job application, as returned to the caller and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub company_name: String,
    pub position: String,
    pub location: String,
    pub job_description_summary: String,
    pub resume_feedback: ResumeFeedback,
    pub cover_letter: CoverLetter,
    pub interview_questions: Vec<InterviewQuestion>,
    pub status: ApplicationStatus,
    /// Absent unless at least one task failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<TaskErrors>,
    pub date_created: DateTime<Utc>,
}
