use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::application::models::{ApplicationRecord, ApplicationStatus};
use crate::errors::AppError;
use crate::store::ApplicationStore;

/// Postgres-backed store. Applications live in a JSONB array on `user_documents`.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn append_application(
        &self,
        user_id: &str,
        record: &ApplicationRecord,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_documents (user_id, applications)
            VALUES ($1, jsonb_build_array($2::jsonb))
            ON CONFLICT (user_id) DO UPDATE
            SET applications = user_documents.applications || EXCLUDED.applications,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(record))
        .execute(&self.pool)
        .await?;

        debug!("Appended application {} for user {user_id}", record.id);
        Ok(result.rows_affected() > 0)
    }

    async fn list_applications(&self, user_id: &str) -> Result<Vec<ApplicationRecord>, AppError> {
        let applications: Option<Json<Vec<ApplicationRecord>>> =
            sqlx::query_scalar("SELECT applications FROM user_documents WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(applications.map(|Json(apps)| apps).unwrap_or_default())
    }

    async fn get_application(
        &self,
        user_id: &str,
        application_id: Uuid,
    ) -> Result<Option<ApplicationRecord>, AppError> {
        let application: Option<Json<ApplicationRecord>> = sqlx::query_scalar(
            r#"
            SELECT app
            FROM user_documents, jsonb_array_elements(applications) AS app
            WHERE user_id = $1 AND app->>'id' = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(application_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(application.map(|Json(app)| app))
    }

    async fn delete_application(
        &self,
        user_id: &str,
        application_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_documents
            SET applications = (
                    SELECT COALESCE(jsonb_agg(app ORDER BY ord), '[]'::jsonb)
                    FROM jsonb_array_elements(applications) WITH ORDINALITY AS t(app, ord)
                    WHERE app->>'id' <> $2
                ),
                updated_at = now()
            WHERE user_id = $1
              AND applications @> jsonb_build_array(jsonb_build_object('id', $2::text))
            "#,
        )
        .bind(user_id)
        .bind(application_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        user_id: &str,
        application_id: Uuid,
        status: &ApplicationStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_documents
            SET applications = (
                    SELECT jsonb_agg(
                        CASE WHEN app->>'id' = $2
                             THEN jsonb_set(app, '{status}', to_jsonb($3::text))
                             ELSE app
                        END
                        ORDER BY ord
                    )
                    FROM jsonb_array_elements(applications) WITH ORDINALITY AS t(app, ord)
                ),
                updated_at = now()
            WHERE user_id = $1
              AND applications @> jsonb_build_array(jsonb_build_object('id', $2::text))
            "#,
        )
        .bind(user_id)
        .bind(application_id.to_string())
        .bind(status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_resume(
        &self,
        user_id: &str,
        resume_text: &str,
        resume_key: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_documents (user_id, resume_text, resume_key)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET resume_text = EXCLUDED.resume_text,
                resume_key = EXCLUDED.resume_key,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(resume_text)
        .bind(resume_key)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn resume_key(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let key: Option<Option<String>> =
            sqlx::query_scalar("SELECT resume_key FROM user_documents WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(key.flatten())
    }
}
