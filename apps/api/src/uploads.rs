//! Resume upload — accepts a PDF, stores the original in S3, extracts its text
//! and saves the text on the user's document. The stored original can be
//! downloaded again.

use aws_sdk_s3::primitives::ByteStream;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF";
const RESUME_DISPOSITION: &str = "attachment; filename=\"resume.pdf\"";

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub resume_text: String,
    pub resume_key: String,
}

/// POST /api/v1/users/:user_id/resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_file_field(multipart).await?;
    validate_pdf(&upload, state.config.max_upload_kb)?;

    let resume_text = extract_text(upload.bytes.clone()).await?;

    let resume_key = resume_key(&user_id);
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&resume_key)
        .content_type(PDF_CONTENT_TYPE)
        .body(ByteStream::from(upload.bytes))
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Failed to upload resume: {e}")))?;

    let saved = state
        .store
        .save_resume(&user_id, &resume_text, &resume_key)
        .await?;
    if !saved {
        return Err(AppError::Persistence(
            "Failed to update user resume".to_string(),
        ));
    }

    info!(
        "Stored resume {} for user {} ({} chars extracted)",
        resume_key,
        user_id,
        resume_text.len()
    );

    Ok(Json(UploadResponse {
        message: "Resume parsed and saved successfully.".to_string(),
        resume_text,
        resume_key,
    }))
}

/// GET /api/v1/users/:user_id/resume
///
/// Streams back the PDF saved by the last upload as an attachment.
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let key = state
        .store
        .resume_key(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No resume uploaded for user {user_id}")))?;

    let object = state
        .s3
        .get_object()
        .bucket(&state.config.s3_bucket)
        .key(&key)
        .send()
        .await
        .map_err(|e| match e.as_service_error() {
            Some(err) if err.is_no_such_key() => {
                AppError::NotFound(format!("Resume {key} not found"))
            }
            _ => AppError::S3(format!("Failed to fetch resume {key}: {e}")),
        })?;

    let bytes = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::S3(format!("Failed to read resume {key}: {e}")))?
        .into_bytes();

    info!("Serving resume {} ({} bytes) for user {}", key, bytes.len(), user_id);

    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, RESUME_DISPOSITION),
        ],
        bytes,
    )
        .into_response())
}

/// Object key for a user's resume. One resume per user; uploads overwrite.
pub fn resume_key(user_id: &str) -> String {
    format!("resumes/{user_id}-resume.pdf")
}

async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {e}")))?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::Validation("No file provided".to_string()))
}

/// Accepts only PDFs under the size limit: `.pdf` name, PDF content type, `%PDF` header.
pub fn validate_pdf(upload: &UploadedFile, max_kb: usize) -> Result<(), AppError> {
    let is_pdf_name = upload.file_name.to_ascii_lowercase().ends_with(".pdf");
    let is_pdf_type = upload.content_type.as_deref() == Some(PDF_CONTENT_TYPE);
    if !is_pdf_name || !is_pdf_type || !upload.bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }

    if upload.bytes.len() > max_kb * 1024 {
        return Err(AppError::Validation(format!(
            "File size exceeds the limit of {max_kb} KB"
        )));
    }

    Ok(())
}

/// PDF parsing is CPU-bound, so it runs on the blocking pool.
async fn extract_text(bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "No text could be extracted from the PDF".to_string(),
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_accepts_small_pdf() {
        let file = upload("resume.PDF", Some("application/pdf"), b"%PDF-1.7\n...");
        assert!(validate_pdf(&file, 400).is_ok());
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let file = upload("resume.docx", Some("application/pdf"), b"%PDF-1.7");
        assert!(matches!(validate_pdf(&file, 400), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_disguised_file() {
        let file = upload("resume.pdf", Some("application/pdf"), b"MZ\x90\x00");
        assert!(matches!(validate_pdf(&file, 400), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_missing_content_type() {
        let file = upload("resume.pdf", None, b"%PDF-1.7");
        assert!(validate_pdf(&file, 400).is_err());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let mut data = b"%PDF-1.7".to_vec();
        data.resize(2048, b' ');
        let file = UploadedFile {
            file_name: "resume.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from(data),
        };
        match validate_pdf(&file, 1) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("1 KB")),
            other => panic!("expected size rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_resume_key_is_per_user() {
        assert_eq!(resume_key("auth0|abc"), "resumes/auth0|abc-resume.pdf");
    }
}
