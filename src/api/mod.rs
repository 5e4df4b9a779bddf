// src/api/mod.rs
// HTTP surface: chat routes, health, error rendering

pub mod error;
pub mod http;

pub use error::{ApiError, ApiResult};
pub use http::create_router;
