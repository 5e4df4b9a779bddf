//! Chat turn handling
//!
//! One chat request, end to end:
//! - validate and bound the inbound body (`request`)
//! - resolve the language and, in persona mode, the session persona
//! - at most two upstream attempts, each judged by the `ReplyPipeline`
//! - per-language fallback when nothing acceptable comes back
//! - a sampled typing delay before the reply is released

pub mod random;
pub mod request;
pub mod service;

pub use random::{OsRandom, RandomSource, SeededRandom};
pub use request::{ChatRequest, PreparedTurn};
pub use service::{ChatReply, ChatService, LanguageHints, PersonaReply};

/// Request-level failures. Upstream problems are not here: they end in a fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is too long (max {limit} characters)")]
    MessageTooLong { limit: usize },

    #[error("Conversation history is too long ({0})")]
    HistoryTooLong(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Request body is too large")]
    BodyTooLarge,

    #[error("Internal error: {0}")]
    Internal(String),
}
