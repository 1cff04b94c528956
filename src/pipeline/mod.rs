//! Pipeline entry points for client operations.
//!
//! - `run_posts`, `run_like_counts`: Blog list views
//! - `run_show`, `run_like`, `run_comment`: Blog detail actions
//! - `run_contact`, `run_newsletter`: Form submissions

pub mod detail;
pub mod forms;
pub mod posts;

use std::sync::{Arc, Mutex};

use futures::future;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::models::{Config, UserIdentity};
use crate::services::{Analytics, AnalyticsEvent, ApiClient, BlogApi};
use crate::services::identity;
use crate::storage::KeyValueStore;

pub use detail::{CommentTarget, require_user, run_comment, run_like, run_show};
pub use forms::{NewsletterAction, run_contact, run_newsletter};
pub use posts::{LikeRow, run_like_counts, run_posts};

/// Shared handles for one CLI invocation.
pub struct Context {
    pub config: Config,
    pub client: ApiClient,
    pub api: Arc<dyn BlogApi>,
    pub store: Arc<dyn KeyValueStore>,
    analytics: Analytics,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Context {
    /// Build a context talking to the configured backend.
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let client = ApiClient::new(&config.api)?;
        let api: Arc<dyn BlogApi> = Arc::new(client.clone());
        Ok(Self::with_parts(config, client, api, store))
    }

    pub fn with_parts(
        config: Config,
        client: ApiClient,
        api: Arc<dyn BlogApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let analytics = Analytics::new(client.clone(), &config.analytics);
        Self {
            config,
            client,
            api,
            store,
            analytics,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// The remembered user, if any.
    pub async fn user(&self) -> Option<UserIdentity> {
        identity::load(&*self.store).await
    }

    /// Queue an analytics event without waiting for it.
    pub fn track(&self, event: AnalyticsEvent) {
        if let Some(handle) = self.analytics.track(event) {
            self.pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(handle);
        }
    }

    /// Wait for queued analytics events before the process exits.
    pub async fn flush(&self) {
        let handles: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        if handles.is_empty() {
            return;
        }
        log::debug!("Flushing {} analytics events", handles.len());
        future::join_all(handles).await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::AnalyticsConfig;
    use crate::services::testing::{MockBlogApi, ScriptedTransport};
    use crate::storage::MemoryStorage;

    /// Context over a mock blog backend with analytics disabled.
    pub(crate) fn context(
        api: Arc<MockBlogApi>,
        transport: Arc<ScriptedTransport>,
    ) -> (Context, Arc<MemoryStorage>) {
        let config = Config {
            analytics: AnalyticsConfig { enabled: false },
            ..Default::default()
        };
        let client = ApiClient::with_transport(&config.api, transport).unwrap();
        let store = Arc::new(MemoryStorage::new());
        (Context::with_parts(config, client, api, store.clone()), store)
    }
}
