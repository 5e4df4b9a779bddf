// src/api/http/mod.rs

pub mod chat;
pub mod cookies;
pub mod health;
pub mod router;

pub use router::create_router;
