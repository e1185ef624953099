//! Core utilities shared by the feeds and the reconciler
//!
//! - `http`: request headers for feed endpoints
//! - `retry`: bounded exponential backoff around fetches

pub mod http;
pub mod retry;

pub use http::{feed_header_map, API_TOKEN_ENV_VAR};
pub use retry::{retry_with_backoff, RetryPolicy};
