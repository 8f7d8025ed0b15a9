//! Scripted `ApplicationGenerator` for tests. Each task follows its own `Behavior`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::generation::generator::{
    ApplicationGenerator, CoverLetter, GenerationFailure, GenerationInput, InterviewQuestion,
    QuestionType, ResumeFeedback,
};

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Delay(Duration),
    Fail(&'static str),
    Panic,
    Hang,
}

pub struct ScriptedGenerator {
    resume_feedback: Behavior,
    cover_letter: Behavior,
    interview_questions: Behavior,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
}

impl ScriptedGenerator {
    pub fn succeeding() -> Self {
        Self {
            resume_feedback: Behavior::Succeed,
            cover_letter: Behavior::Succeed,
            interview_questions: Behavior::Succeed,
            calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_resume_feedback(mut self, behavior: Behavior) -> Self {
        self.resume_feedback = behavior;
        self
    }

    pub fn with_cover_letter(mut self, behavior: Behavior) -> Self {
        self.cover_letter = behavior;
        self
    }

    pub fn with_interview_questions(mut self, behavior: Behavior) -> Self {
        self.interview_questions = behavior;
        self
    }

    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn play(&self, behavior: Behavior) -> Result<(), GenerationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(self.in_flight.clone());
        match behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Behavior::Fail(reason) => Err(GenerationFailure::new(reason)),
            Behavior::Panic => panic!("scripted panic"),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ApplicationGenerator for ScriptedGenerator {
    async fn resume_feedback(
        &self,
        _input: &GenerationInput,
    ) -> Result<ResumeFeedback, GenerationFailure> {
        self.play(self.resume_feedback).await?;
        Ok(ResumeFeedback {
            company_name: Some("Acme".to_string()),
            position: Some("Senior Rust Engineer".to_string()),
            location: Some("Berlin".to_string()),
            job_description: Some("Build the storage engine.".to_string()),
            resume_feedback: Some("Lead with measurable outcomes.".to_string()),
        })
    }

    async fn cover_letter(&self, _input: &GenerationInput) -> Result<CoverLetter, GenerationFailure> {
        self.play(self.cover_letter).await?;
        Ok(CoverLetter {
            company_name: Some("Acme".to_string()),
            position: Some("Senior Rust Engineer".to_string()),
            cover_letter_body: Some("Dear Hiring Manager, ...".to_string()),
        })
    }

    async fn interview_questions(
        &self,
        _input: &GenerationInput,
        question_type: QuestionType,
        num_questions: u32,
    ) -> Result<Vec<InterviewQuestion>, GenerationFailure> {
        self.play(self.interview_questions).await?;
        Ok((1..=num_questions)
            .map(|n| InterviewQuestion {
                question_type: question_type.to_string(),
                question: format!("Question {n}"),
                answer: format!("Answer {n}"),
            })
            .collect())
    }
}
