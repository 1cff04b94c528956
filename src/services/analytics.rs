// src/services/analytics.rs

//! Fire-and-forget usage events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::models::AnalyticsConfig;
use crate::services::api::{ApiClient, RequestOptions};
use crate::services::endpoints::Endpoint;

/// A named event with free-form properties.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Clone)]
pub struct Analytics {
    client: ApiClient,
    enabled: bool,
}

impl Analytics {
    pub fn new(client: ApiClient, config: &AnalyticsConfig) -> Self {
        Self {
            client,
            enabled: config.enabled,
        }
    }

    /// Post the event in the background. Failures are logged and dropped.
    ///
    /// Returns `None` when analytics is disabled.
    pub fn track(&self, event: AnalyticsEvent) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }
        let client = self.client.clone();
        Some(tokio::spawn(async move {
            let payload = match serde_json::to_value(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    log::debug!("Dropping analytics event {}: {}", event.name, e);
                    return;
                }
            };
            let response = client
                .make_api_request(&Endpoint::AnalyticsEvent, Some(&payload), &RequestOptions::default())
                .await;
            if !response.success {
                log::debug!(
                    "Analytics event {} not delivered: {}",
                    event.name,
                    response.error.unwrap_or_default()
                );
            }
        }))
    }
}
