// src/api/http/router.rs
// HTTP router composition: routes plus CORS, tracing, panic and body-size layers

use std::any::Any;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use super::chat::{chat_handler, persona_chat_handler};
use super::health::health_handler;
use crate::api::error::INTERNAL_FALLBACK_REPLY;
use crate::state::AppState;

fn panic_reply(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Handler panicked");
    (StatusCode::OK, Json(json!({ "reply": INTERNAL_FALLBACK_REPLY }))).into_response()
}

/// Permissive CORS. Preflight `OPTIONS` requests are answered here with an empty body.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config().max_body_bytes;

    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/persona-chat", post(persona_chat_handler));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_reply))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}
