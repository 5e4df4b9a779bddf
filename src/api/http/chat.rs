// src/api/http/chat.rs
// POST /api/chat and POST /api/persona-chat

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use super::cookies::{cookie_value, session_cookie};
use crate::api::error::ApiResult;
use crate::chat::{ChatError, ChatReply, ChatRequest, LanguageHints};
use crate::persona::encode_persona;
use crate::state::AppState;

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn language_hints(headers: &HeaderMap) -> LanguageHints<'_> {
    LanguageHints {
        referer: header_str(headers, header::REFERER),
        accept_language: header_str(headers, header::ACCEPT_LANGUAGE),
    }
}

/// Body bytes to a request. Rejections become chat errors so the client
/// still gets a `{ reply }` body.
fn read_request(body: Result<Bytes, BytesRejection>) -> Result<ChatRequest, ChatError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ChatError::BodyTooLarge
        } else {
            ChatError::MalformedBody(rejection.body_text())
        }
    })?;
    ChatRequest::parse(&bytes)
}

pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<ChatReply>> {
    let span = info_span!(
        "chat",
        request_id = %Uuid::new_v4(),
        route = "/api/chat",
        lang = tracing::field::Empty
    );

    async move {
        let request = read_request(body)?;
        let reply = state.chat.chat(&request, language_hints(&headers)).await?;
        debug!(fallback = reply.used_fallback, attempts = reply.attempts, "Reply ready");
        Ok(Json(reply))
    }
    .instrument(span)
    .await
}

pub async fn persona_chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Response> {
    let span = info_span!(
        "persona_chat",
        request_id = %Uuid::new_v4(),
        route = "/api/persona-chat",
        lang = tracing::field::Empty
    );

    async move {
        let request = read_request(body)?;
        let config = state.config();
        let cookie = cookie_value(&headers, &config.persona_cookie);

        let reply = state
            .chat
            .persona_chat(&request, language_hints(&headers), cookie)
            .await?;
        debug!(
            fallback = reply.chat.used_fallback,
            attempts = reply.chat.attempts,
            fresh_persona = reply.fresh_persona,
            "Reply ready"
        );

        if !reply.fresh_persona {
            return Ok(Json(reply).into_response());
        }

        let encoded = encode_persona(&reply.persona).map_err(|e| ChatError::Internal(e.to_string()))?;
        let set_cookie = session_cookie(&config.persona_cookie, &encoded, config.cookie_secure);
        Ok(([(header::SET_COOKIE, set_cookie)], Json(reply)).into_response())
    }
    .instrument(span)
    .await
}
