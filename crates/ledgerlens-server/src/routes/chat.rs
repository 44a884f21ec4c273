//! Chat endpoint answering questions about the session's invoice.

use axum::{Json, extract::State};
use axum_extra::extract::SignedCookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Request body for `/chat/message`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageRequest {
    /// The user's question.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `/chat/message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    /// Always `true` on a 200.
    pub success: bool,

    /// The model's answer (or its apologetic fallback string).
    pub response: String,

    /// Base name of the invoice the answer is grounded in.
    pub invoice_file: String,
}

/// POST `/chat/message` - answer a question about the stored invoice.
///
/// Requires a non-empty message and a prior upload in the session; both are
/// 400s otherwise. Model failures are absorbed by the client and arrive as
/// an apologetic `response` with HTTP 200.
pub async fn chat_message_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<ChatMessageRequest>,
) -> Result<(SignedCookieJar, Json<ChatMessageResponse>)> {
    let message = request
        .message
        .ok_or_else(|| ServerError::BadRequest("No message provided".to_string()))?;

    let message = message.trim().to_string();
    if message.is_empty() {
        return Err(ServerError::BadRequest("Empty message".to_string()));
    }

    let (session_id, jar) = state.establish_session(jar).await;

    let record = state.sessions.invoice(session_id).await.ok_or_else(|| {
        ServerError::BadRequest(
            "No invoice data available. Please upload an invoice first.".to_string(),
        )
    })?;

    let context = state.context.context_for(session_id, &message).await;
    info!(
        session_id = %session_id,
        context_len = context.len(),
        "Sending chat request"
    );
    let answer = state.client.chat(&message, &context).await;

    Ok((
        jar,
        Json(ChatMessageResponse {
            success: true,
            response: answer,
            invoice_file: record.file_name,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parsing() {
        let request: ChatMessageRequest =
            serde_json::from_str(r#"{"message": "What is the total?"}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("What is the total?"));

        // A body without the field parses; the handler turns it into a 400
        let request: ChatMessageRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_none());
    }

    #[test]
    fn test_response_serialization() {
        let response = ChatMessageResponse {
            success: true,
            response: "The total is $2,712.50.".to_string(),
            invoice_file: "inv.png".to_string(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["response"], "The total is $2,712.50.");
        assert_eq!(value["invoice_file"], "inv.png");
    }
}
