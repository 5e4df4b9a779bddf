// tests/test_helpers.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};

use stranger_chat::{
    api::create_router,
    chat::{ChatService, SeededRandom},
    config::ChatConfig,
    llm::{CompletionClient, CompletionRequest, UpstreamError},
    state::AppState,
};

/// What the fake upstream does on one call.
pub enum Step {
    Reply(&'static str),
    Fail(UpstreamError),
    Panic,
}

/// Fake completion API: replays steps in order and records every request.
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        self.calls.lock().unwrap().push(request.clone());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(text.to_string()),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Panic) => panic!("scripted upstream panic"),
            None => Err(UpstreamError::EmptyChoice),
        }
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Defaults with no typing delay and a small body limit.
pub fn test_config() -> ChatConfig {
    ChatConfig {
        typing_delay_min_ms: 0,
        typing_delay_max_ms: 0,
        max_body_bytes: 4096,
        ..ChatConfig::default()
    }
}

pub fn create_test_app(steps: Vec<Step>) -> (axum::Router, Arc<ScriptedClient>) {
    create_test_app_with(test_config(), steps)
}

pub fn create_test_app_with(config: ChatConfig, steps: Vec<Step>) -> (axum::Router, Arc<ScriptedClient>) {
    let client = ScriptedClient::new(steps);
    let chat = ChatService::new(Arc::new(config), client.clone(), Arc::new(SeededRandom(2024)))
        .expect("test config is valid");
    (create_router(AppState::new(chat)), client)
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
