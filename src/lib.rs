// src/lib.rs

pub mod api;
pub mod chat;
pub mod config;
pub mod llm;
pub mod locale;
pub mod persona;
pub mod pipeline;
pub mod prompt;
pub mod state;
