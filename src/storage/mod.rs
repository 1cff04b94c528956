//! Client-side key/value storage.
//!
//! Plays the role of the browser's local storage: a small, string-keyed
//! cache that speeds up the UI but is never the source of truth.
//!
//! ## Keys
//!
//! ```text
//! blog_liked_{slug}      # bool, like flag for the current user
//! blog_comments_{slug}   # Vec<Comment>, last known comment thread
//! user_identity          # UserIdentity, the "enter your name" label
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Key holding the client-local user label.
pub const USER_IDENTITY_KEY: &str = "user_identity";

/// Key holding the like flag for a blog.
pub fn liked_key(slug: &str) -> String {
    format!("blog_liked_{slug}")
}

/// Key holding the cached comment thread for a blog.
pub fn comments_key(slug: &str) -> String {
    format!("blog_comments_{slug}")
}

/// Trait for string-keyed storage backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a raw value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a JSON value.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

/// Read a cached value, treating storage or decode failures as a miss.
pub async fn read_cached<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match read_json(store, key).await {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring unreadable cache entry {}: {}", key, e);
            None
        }
    }
}

/// Write a cached value, logging instead of failing.
pub async fn write_cached<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = write_json(store, key, value).await {
        log::warn!("Failed to write cache entry {}: {}", key, e);
    }
}
