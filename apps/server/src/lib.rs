//! Gentree search server
//!
//! HTTP front end for the `gentree-search` core:
//! - `GET /v1/search` person search with paging and redaction
//! - Postgres JSONB person storage
//! - Layered configuration and structured logging

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod request_context;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
