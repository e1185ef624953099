//! HTTP utilities for feed requests

use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

/// Environment variable holding the feed API token
pub const API_TOKEN_ENV_VAR: &str = "HOOPS_SYNC_API_TOKEN";

/// Build request headers: always `Accept: application/json`, plus a bearer
/// token when `HOOPS_SYNC_API_TOKEN` is set and not blank.
pub fn feed_header_map() -> Result<HeaderMap> {
    let token = std::env::var(API_TOKEN_ENV_VAR).ok();
    header_map_with_token(token.as_deref())
}

pub fn header_map_with_token(token: Option<&str>) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        value.set_sensitive(true);
        h.insert(AUTHORIZATION, value);
    }
    Ok(h)
}
