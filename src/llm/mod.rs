// src/llm/mod.rs
// Upstream model access: chat types and the completion client

pub mod client;
pub mod types;

pub use client::{CompletionClient, OpenAiCompatClient, UpstreamError};
pub use types::{ChatTurn, CompletionRequest, Role, SamplingParams};
