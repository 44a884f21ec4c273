//! Session introspection and teardown endpoints.

use axum::{Json, extract::State};
use axum_extra::extract::SignedCookieJar;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

/// Response from `/clear_session`.
#[derive(Debug, Serialize)]
pub struct ClearSessionResponse {
    /// Always `true`.
    pub success: bool,

    /// Confirmation message.
    pub message: String,
}

/// Response from `/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `true`.
    pub success: bool,

    /// Whether the session holds extraction data.
    pub has_invoice: bool,

    /// Base name of the stored invoice image, if any.
    pub invoice_file: Option<String>,

    /// URL of the stored invoice image, if any.
    pub image_url: Option<String>,
}

/// POST `/clear_session` - drop the session's state and its cookie.
pub async fn clear_session_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<ClearSessionResponse>)> {
    if let Some(id) = state.presented_session(&jar) {
        let removed = state.sessions.clear(id).await;
        info!(session_id = %id, removed, "Clearing session");
    }

    let jar = jar.remove(state.removal_cookie());

    Ok((
        jar,
        Json(ClearSessionResponse {
            success: true,
            message: "Session cleared successfully".to_string(),
        }),
    ))
}

/// GET `/status` - current session state.
pub async fn status_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<StatusResponse>)> {
    let (session_id, jar) = state.establish_session(jar).await;

    let response = match state.sessions.invoice(session_id).await {
        Some(record) => StatusResponse {
            success: true,
            has_invoice: true,
            image_url: Some(format!("/uploads/{}", record.file_name)),
            invoice_file: Some(record.file_name),
        },
        None => StatusResponse {
            success: true,
            has_invoice: false,
            invoice_file: None,
            image_url: None,
        },
    };

    Ok((jar, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization_with_invoice() {
        let response = StatusResponse {
            success: true,
            has_invoice: true,
            invoice_file: Some("inv.png".to_string()),
            image_url: Some("/uploads/inv.png".to_string()),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["has_invoice"], true);
        assert_eq!(value["invoice_file"], "inv.png");
        assert_eq!(value["image_url"], "/uploads/inv.png");
    }

    #[test]
    fn test_status_serialization_without_invoice() {
        let response = StatusResponse {
            success: true,
            has_invoice: false,
            invoice_file: None,
            image_url: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["has_invoice"], false);
        assert_eq!(value["invoice_file"], serde_json::Value::Null);
    }
}
