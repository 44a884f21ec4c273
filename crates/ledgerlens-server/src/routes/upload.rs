//! Invoice upload and extraction endpoint.

use axum::{
    Json,
    extract::{Multipart, State},
};
use axum_extra::extract::SignedCookieJar;
use serde::Serialize;
use tracing::{info, warn};

use ledgerlens_model::load_prompt;
use ledgerlens_session::InvoiceRecord;

use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::uploads::{ALLOWED_EXTENSIONS, has_allowed_extension, save_upload};

/// Multipart field carrying the invoice image.
pub const UPLOAD_FIELD: &str = "invoice_file";

/// Response from a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`; extraction failures are reported inside `data` via
    /// its `extraction_successful` flag.
    pub success: bool,

    /// The extraction result (possibly a failure-wrapped fallback).
    pub data: serde_json::Value,

    /// `data` pretty-printed for display.
    pub formatted_data: String,

    /// URL the saved image is served from.
    pub image_url: String,

    /// Base name of the saved image.
    pub invoice_file: String,
}

/// POST `/upload` - validate, save, and extract an uploaded invoice image.
///
/// Validation failures are 400s. Model failures are *not* errors here: the
/// client absorbs them, and the response carries the failure-flagged result
/// with HTTP 200.
pub async fn upload_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut multipart: Multipart,
) -> Result<(SignedCookieJar, Json<UploadResponse>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Malformed multipart request: {e}")))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Failed to read upload: {e}")))?;
            upload = Some((file_name, bytes.to_vec()));
            break;
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ServerError::BadRequest("No file uploaded".to_string()))?;

    if file_name.is_empty() {
        return Err(ServerError::BadRequest("No file selected".to_string()));
    }

    if !has_allowed_extension(&file_name, ALLOWED_EXTENSIONS) {
        return Err(ServerError::BadRequest(
            "Invalid file type. Please upload an image file (PNG, JPG, JPEG, GIF, BMP, WEBP)"
                .to_string(),
        ));
    }

    let path = save_upload(&state.config.upload_dir, &file_name, &bytes).await?;
    let prompt = load_prompt(state.config.prompt_path.as_deref()).await;

    info!(
        path = %path.display(),
        client = state.client.name(),
        "Extracting invoice data"
    );
    let extracted = state.client.extract(&path, &prompt).await;

    if extracted.successful() {
        info!(
            fields = extracted.field_names().count(),
            "Invoice extraction completed"
        );
    } else {
        warn!(
            error = extracted.error().unwrap_or("unknown"),
            "Invoice extraction was not successful"
        );
    }

    let (session_id, jar) = state.establish_session(jar).await;

    let base_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ServerError::Internal("Saved path has no file name".to_string()))?;

    let data = extracted.to_value();
    state
        .context
        .update(
            session_id,
            InvoiceRecord {
                data: data.clone(),
                file_name: base_name.clone(),
                file_path: path,
            },
        )
        .await;

    Ok((
        jar,
        Json(UploadResponse {
            success: true,
            data,
            formatted_data: extracted.to_pretty_string(),
            image_url: format!("/uploads/{base_name}"),
            invoice_file: base_name,
        }),
    ))
}
