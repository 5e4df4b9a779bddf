// tests/http_chat.rs

mod test_helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use stranger_chat::api::error::INTERNAL_FALLBACK_REPLY;
use stranger_chat::llm::{Role, UpstreamError};
use stranger_chat::locale::{Catalog, LanguageCode};
use test_helpers::{Step, create_test_app, post_json, read_json};

#[tokio::test]
async fn test_plain_chat_returns_cleaned_reply() {
    let (app, client) = create_test_app(vec![Step::Reply("<think>be casual</think>**heyy** what's up $$")]);

    let response = app
        .oneshot(post_json("/api/chat", json!({"message": "hi", "lang": "en"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["reply"], "heyy what's up");
    assert_eq!(body["lang"], "EN");
    assert_eq!(body["delay_ms"], 0);
    assert!(body.get("persona").is_none());

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].messages[0].role, Role::System);
    assert_eq!(calls[0].messages.last().unwrap().content, "hi");
}

#[tokio::test]
async fn test_language_from_referer_path() {
    let (app, _) = create_test_app(vec![Step::Reply("こんにちは！元気？")]);

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .header(header::REFERER, "https://chat.example.com/ja/room")
        .header(header::ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9")
        .body(Body::from(json!({"init": true}).to_string()))
        .unwrap();

    let body = read_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(body["lang"], "JA");
    assert_eq!(body["reply"], "こんにちは！元気？");
}

#[tokio::test]
async fn test_duplicate_reply_is_retried_once() {
    let (app, client) = create_test_app(vec![
        Step::Reply("sounds good, let's go!"),
        Step::Reply("ok wait, where are you from"),
    ]);
    let body = json!({
        "message": "sure",
        "history": [
            {"role": "user", "content": "wanna chat"},
            {"role": "assistant", "content": "sounds good let's go"}
        ]
    });

    let response = app.oneshot(post_json("/api/chat", body.to_string())).await.unwrap();
    let body = read_json(response).await;

    assert_eq!(body["reply"], "ok wait, where are you from");
    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].sampling.temperature > calls[0].sampling.temperature);
}

#[tokio::test]
async fn test_upstream_failure_still_answers_200_with_fallback() {
    let (app, client) = create_test_app(vec![Step::Fail(UpstreamError::Timeout)]);

    let response = app
        .oneshot(post_json("/api/chat", json!({"message": "안녕", "lang": "KO"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let catalog = Catalog::builtin();
    let fallbacks = catalog.entry(LanguageCode::Ko).fallbacks;
    assert!(fallbacks.contains(&body["reply"].as_str().unwrap()));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_persona_cookie_is_set_then_reused() {
    let (app, _) = create_test_app(vec![Step::Reply("hey stranger"), Step::Reply("haha same, long day")]);

    let first = app
        .clone()
        .oneshot(post_json("/api/persona-chat", json!({"init": true, "lang": "ES"}).to_string()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let set_cookie = first
        .headers()
        .get(header::SET_COOKIE)
        .expect("new chat sets the persona cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("rcs_persona="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Secure"));

    let first_body = read_json(first).await;
    let persona = first_body["persona"].clone();
    let age = persona["age"].as_u64().unwrap();
    assert!((19..=46).contains(&age));
    assert_eq!(persona["gender"], "female");

    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/persona-chat")
        .header("content-type", "application/json")
        .header(header::COOKIE, cookie_pair)
        .body(Body::from(
            json!({
                "message": "tired lol",
                "lang": "ES",
                "history": [{"role": "assistant", "content": "hey stranger"}]
            })
            .to_string(),
        ))
        .unwrap();

    let second = app.oneshot(request).await.unwrap();
    assert!(second.headers().get(header::SET_COOKIE).is_none());
    let second_body = read_json(second).await;
    assert_eq!(second_body["persona"], persona);
    assert_eq!(second_body["reply"], "haha same, long day");
}

#[tokio::test]
async fn test_persona_prompt_ends_with_safety_turn() {
    let (app, client) = create_test_app(vec![Step::Reply("hola")]);

    app.oneshot(post_json("/api/persona-chat", json!({"init": true, "lang": "ES"}).to_string()))
        .await
        .unwrap();

    let calls = client.calls();
    let last = calls[0].messages.last().unwrap();
    assert_eq!(last.role, Role::System);
    assert_eq!(last.content, stranger_chat::prompt::TRAILING_SAFETY);
}

#[tokio::test]
async fn test_oversized_message_is_rejected_with_reply() {
    let (app, client) = create_test_app(vec![Step::Reply("never sent")]);
    let message = "a".repeat(1001);

    let response = app
        .oneshot(post_json("/api/chat", json!({"message": message}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["reply"].as_str().unwrap().contains("1000"));
    assert_eq!(body["error_code"], "MESSAGE_TOO_LONG");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (app, _) = create_test_app(vec![]);

    let response = app.oneshot(post_json("/api/chat", "{\"message\": ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "MALFORMED_BODY");
    assert!(body["reply"].is_string());
}

#[tokio::test]
async fn test_body_over_limit_is_413() {
    let (app, client) = create_test_app(vec![]);
    let padding = "x".repeat(8192);

    let response = app
        .oneshot(post_json("/api/chat", json!({"message": "hi", "pad": padding}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = read_json(response).await;
    assert!(body["reply"].is_string());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_panic_in_handler_renders_fallback() {
    let (app, _) = create_test_app(vec![Step::Panic]);

    let response = app
        .oneshot(post_json("/api/chat", json!({"message": "hi"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["reply"], INTERNAL_FALLBACK_REPLY);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = create_test_app(vec![]);

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/persona-chat")
        .header(header::ORIGIN, "https://chat.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    let methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("POST"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_post_responses_carry_cors_header() {
    let (app, _) = create_test_app(vec![Step::Reply("yo")]);

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .header(header::ORIGIN, "https://chat.example.com")
        .body(Body::from(json!({"message": "hey"}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_health_reports_model() {
    let (app, _) = create_test_app(vec![]);

    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "scripted-model");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
