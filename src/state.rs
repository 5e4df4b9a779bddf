// src/state.rs
// Shared, read-only application state handed to every handler

use std::sync::Arc;

use crate::chat::ChatService;
use crate::config::ChatConfig;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        Self { chat: Arc::new(chat) }
    }

    pub fn config(&self) -> &ChatConfig {
        self.chat.config()
    }
}
