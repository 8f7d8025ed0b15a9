//! Application storage — one document per user holding their latest resume and
//! an append-only list of processed applications.
//!
//! `AppState` holds an `Arc<dyn ApplicationStore>`; `PgApplicationStore` is the
//! production backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::models::{ApplicationRecord, ApplicationStatus};
use crate::errors::AppError;

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgApplicationStore;

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Appends to the user's application list. Returns whether a document was modified.
    async fn append_application(
        &self,
        user_id: &str,
        record: &ApplicationRecord,
    ) -> Result<bool, AppError>;

    async fn list_applications(&self, user_id: &str) -> Result<Vec<ApplicationRecord>, AppError>;

    async fn get_application(
        &self,
        user_id: &str,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRecord>, AppError>;

    /// Returns whether an application was removed.
    async fn delete_application(&self, user_id: &str, application_id: Uuid)
        -> Result<bool, AppError>;

    /// Returns whether an application was updated.
    async fn update_status(
        &self,
        user_id: &str,
        application_id: Uuid,
        status: &ApplicationStatus,
    ) -> Result<bool, AppError>;

    /// Stores the user's latest extracted resume text and its object key.
    async fn save_resume(
        &self,
        user_id: &str,
        resume_text: &str,
        resume_key: &str,
    ) -> Result<bool, AppError>;

    /// Object key of the user's stored resume, if one was ever uploaded.
    async fn resume_key(&self, user_id: &str) -> Result<Option<String>, AppError>;
}
