// src/api/error.rs
// Error responses for the chat routes. Every response body is `{ "reply": ... }`
// so the client renders it like any other message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

use crate::chat::ChatError;

/// Reply shown when something unexpected broke; always sent with status 200.
pub const INTERNAL_FALLBACK_REPLY: &str = "sorry, my connection glitched. say that again?";

#[derive(Debug)]
pub struct ApiError {
    pub reply: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    pub fn bad_request(reply: impl Into<String>, code: &str) -> Self {
        Self {
            reply: reply.into(),
            status_code: StatusCode::BAD_REQUEST,
            error_code: Some(code.to_string()),
        }
    }

    pub fn payload_too_large(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            status_code: StatusCode::PAYLOAD_TOO_LARGE,
            error_code: Some("BODY_TOO_LARGE".to_string()),
        }
    }

    /// Generic low-key reply with a success status.
    pub fn internal() -> Self {
        Self {
            reply: INTERNAL_FALLBACK_REPLY.to_string(),
            status_code: StatusCode::OK,
            error_code: None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reply, self.status_code)
    }
}

impl std::error::Error for ApiError {}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::Internal(detail) => error!(detail = %detail, "Internal error in chat handler"),
            _ => warn!(error = %err, "Rejected chat request"),
        }

        match err {
            ChatError::MessageTooLong { limit } => ApiError::bad_request(
                format!("Your message is too long. Please keep it under {limit} characters."),
                "MESSAGE_TOO_LONG",
            ),
            ChatError::HistoryTooLong(_) => ApiError::bad_request(
                "This conversation got too long. Please start a new chat.",
                "HISTORY_TOO_LONG",
            ),
            ChatError::MalformedBody(_) => {
                ApiError::bad_request("Sorry, that message could not be read.", "MALFORMED_BODY")
            }
            ChatError::BodyTooLarge => ApiError::payload_too_large("Your message is too long."),
            ChatError::Internal(_) => ApiError::internal(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "reply": self.reply });
        if let Some(code) = self.error_code {
            body["error_code"] = json!(code);
        }
        (self.status_code, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
