//! In-memory `ApplicationStore` for router and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::models::{ApplicationRecord, ApplicationStatus};
use crate::errors::AppError;
use crate::store::ApplicationStore;

#[derive(Default)]
pub struct MemoryStore {
    applications: Mutex<HashMap<String, Vec<ApplicationRecord>>>,
    resumes: Mutex<HashMap<String, (String, String)>>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    /// Makes `append_application` report that nothing was modified.
    pub fn rejecting_writes() -> Self {
        let store = Self::default();
        store.reject_writes.store(true, Ordering::SeqCst);
        store
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn append_application(
        &self,
        user_id: &str,
        record: &ApplicationRecord,
    ) -> Result<bool, AppError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.applications
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(true)
    }

    async fn list_applications(&self, user_id: &str) -> Result<Vec<ApplicationRecord>, AppError> {
        Ok(self
            .applications
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_application(
        &self,
        user_id: &str,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRecord>, AppError> {
        Ok(self
            .applications
            .lock()
            .unwrap()
            .get(user_id)
            .and_then(|apps| apps.iter().find(|a| a.id == application_id).cloned()))
    }

    async fn delete_application(
        &self,
        user_id: &str,
        application_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut guard = self.applications.lock().unwrap();
        let Some(apps) = guard.get_mut(user_id) else {
            return Ok(false);
        };
        let before = apps.len();
        apps.retain(|a| a.id != application_id);
        Ok(apps.len() != before)
    }

    async fn update_status(
        &self,
        user_id: &str,
        application_id: Uuid,
        status: &ApplicationStatus,
    ) -> Result<bool, AppError> {
        let mut guard = self.applications.lock().unwrap();
        let found = guard
            .get_mut(user_id)
            .and_then(|apps| apps.iter_mut().find(|a| a.id == application_id));
        match found {
            Some(app) => {
                app.status = status.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save_resume(
        &self,
        user_id: &str,
        resume_text: &str,
        resume_key: &str,
    ) -> Result<bool, AppError> {
        self.resumes.lock().unwrap().insert(
            user_id.to_string(),
            (resume_text.to_string(), resume_key.to_string()),
        );
        Ok(true)
    }

    async fn resume_key(&self, user_id: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .get(user_id)
            .map(|(_, key)| key.clone()))
    }
}
