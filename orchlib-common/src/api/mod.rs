//! Framework-independent HTTP API helpers
//!
//! The server wraps these in axum middleware.

pub mod auth;

pub use auth::{bearer_token, load_api_token, token_matches, API_TOKEN_KEY};
