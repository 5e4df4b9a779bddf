// src/prompt/mod.rs
// System prompts and message assembly for upstream attempts

pub mod builder;

pub use builder::{PromptBuilder, PromptMode, TurnInput, RETRY_NUDGE, TRAILING_SAFETY};
