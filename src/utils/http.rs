// src/utils/http.rs

//! HTTP client utilities.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::Result;
use crate::models::ApiConfig;

/// Create the primary asynchronous HTTP client.
///
/// Sends `Accept: application/json` on every request. Timeouts are applied
/// per request, not here.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Create the fallback client used for the single relaxed retry.
///
/// No default headers and HTTP/1.1 only, so it gets past proxies that
/// choke on the primary client's negotiation.
pub fn create_relaxed_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .http1_only()
        .build()?;
    Ok(client)
}
