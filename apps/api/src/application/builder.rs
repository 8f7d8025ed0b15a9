//! Maps aggregated task outputs into the stored `ApplicationRecord`.
//!
//! Pure apart from minting the id and creation timestamp.

use chrono::Utc;
use uuid::Uuid;

use crate::application::models::{ApplicationRecord, ApplicationStatus, TaskErrors};
use crate::generation::generator::{CoverLetter, InterviewQuestion, ResumeFeedback};

pub const NOT_SPECIFIED: &str = "Not specified";

/// Per-task results. A failed task leaves its placeholder (`Default`) in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskResults {
    pub resume_feedback: ResumeFeedback,
    pub cover_letter: CoverLetter,
    pub interview_questions: Vec<InterviewQuestion>,
}

/// Builds a fresh record. `status` is `Submitted` iff `errors` is empty;
/// any failure, including all three, yields `PartialFailure`.
pub fn build_application(results: TaskResults, errors: TaskErrors) -> ApplicationRecord {
    let feedback = &results.resume_feedback;
    let company_name = or_not_specified(feedback.company_name.as_deref());
    let position = or_not_specified(feedback.position.as_deref());
    let location = or_not_specified(feedback.location.as_deref());
    let job_description_summary = or_not_specified(feedback.job_description.as_deref());

    let (status, errors) = if errors.is_empty() {
        (ApplicationStatus::Submitted, None)
    } else {
        (ApplicationStatus::PartialFailure, Some(errors))
    };

    ApplicationRecord {
        id: Uuid::new_v4(),
        company_name,
        position,
        location,
        job_description_summary,
        resume_feedback: results.resume_feedback,
        cover_letter: results.cover_letter,
        interview_questions: results.interview_questions,
        status,
        errors,
        date_created: Utc::now(),
    }
}

fn or_not_specified(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_results() -> TaskResults {
        TaskResults {
            resume_feedback: ResumeFeedback {
                company_name: Some("Acme".to_string()),
                position: Some("Senior Rust Engineer".to_string()),
                location: Some("Berlin".to_string()),
                job_description: Some("Own the storage layer.".to_string()),
                resume_feedback: Some("Quantify your impact.".to_string()),
            },
            cover_letter: CoverLetter {
                company_name: Some("Acme".to_string()),
                position: Some("Senior Rust Engineer".to_string()),
                cover_letter_body: Some("Dear Hiring Manager,".to_string()),
            },
            interview_questions: vec![InterviewQuestion {
                question_type: "Technical".to_string(),
                question: "Explain Send vs Sync.".to_string(),
                answer: "Send moves across threads; Sync shares references.".to_string(),
            }],
        }
    }

    #[test]
    fn test_all_tasks_succeed_is_submitted_without_errors() {
        let record = build_application(full_results(), TaskErrors::new());
        assert_eq!(record.status, ApplicationStatus::Submitted);
        assert!(record.errors.is_none());
        assert_eq!(record.company_name, "Acme");
        assert_eq!(record.job_description_summary, "Own the storage layer.");

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_any_error_is_partial_failure() {
        let mut errors = TaskErrors::new();
        errors.insert("coverLetter".to_string(), "timeout".to_string());

        let record = build_application(full_results(), errors);
        assert_eq!(record.status, ApplicationStatus::PartialFailure);
        assert_eq!(record.errors.as_ref().map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_missing_company_name_defaults() {
        let mut results = full_results();
        results.resume_feedback.company_name = None;
        results.resume_feedback.location = Some("  ".to_string());

        let record = build_application(results, TaskErrors::new());
        assert_eq!(record.company_name, NOT_SPECIFIED);
        assert_eq!(record.location, NOT_SPECIFIED);
        assert_eq!(record.position, "Senior Rust Engineer");
    }

    #[test]
    fn test_failed_feedback_defaults_every_derived_field() {
        let mut results = full_results();
        results.resume_feedback = ResumeFeedback::default();
        let mut errors = TaskErrors::new();
        errors.insert("resumeFeedback".to_string(), "malformed JSON".to_string());

        let record = build_application(results, errors);
        assert_eq!(record.company_name, NOT_SPECIFIED);
        assert_eq!(record.position, NOT_SPECIFIED);
        assert_eq!(record.location, NOT_SPECIFIED);
        assert_eq!(record.job_description_summary, NOT_SPECIFIED);
        assert!(record.cover_letter.cover_letter_body.is_some());
    }

    #[test]
    fn test_each_build_mints_a_new_id() {
        let first = build_application(full_results(), TaskErrors::new());
        let second = build_application(full_results(), TaskErrors::new());
        assert_ne!(first.id, second.id);
        assert!(second.date_created >= first.date_created);
    }

    #[test]
    fn test_serialized_record_uses_camel_case_fields() {
        let json = serde_json::to_value(build_application(full_results(), TaskErrors::new())).unwrap();
        for key in [
            "id",
            "companyName",
            "position",
            "location",
            "jobDescriptionSummary",
            "resumeFeedback",
            "coverLetter",
            "interviewQuestions",
            "status",
            "dateCreated",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["status"], "Submitted");
    }
}
