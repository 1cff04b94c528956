// src/services/transport.rs

//! The network seam under `ApiClient`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::models::ApiConfig;
use crate::services::endpoints::Method;
use crate::utils::http::{create_async_client, create_relaxed_client};

/// How strictly a request negotiates content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// JSON body with `Content-Type: application/json`
    Strict,
    /// Body sent as `text/plain`, no content negotiation
    Relaxed,
}

/// A fully resolved outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
    pub timeout: Duration,
    pub mode: RequestMode,
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends HTTP requests. Implemented with reqwest; scripted in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply>;
}

/// reqwest-backed transport holding one client per request mode.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    strict: reqwest::Client,
    relaxed: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            strict: create_async_client(config)?,
            relaxed: create_relaxed_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply> {
        let client = match request.mode {
            RequestMode::Strict => &self.strict,
            RequestMode::Relaxed => &self.relaxed,
        };

        let mut builder = client
            .request(request.method.into(), request.url)
            .timeout(request.timeout);

        if let Some(body) = &request.body {
            builder = match request.mode {
                RequestMode::Strict => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(serde_json::to_vec(body)?),
                RequestMode::Relaxed => builder
                    .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
                    .body(body.to_string()),
            };
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}
