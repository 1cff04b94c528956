//! Local filesystem storage implementation.
//!
//! Each key is one JSON document under the root directory.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml                    # Client configuration
//! └── local/
//!     ├── user_identity.json
//!     ├── blog_liked_{slug}.json
//!     └── blog_comments_{slug}.json
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::KeyValueStore;

/// Distinguishes temp files of writes racing on the same key.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Filesystem-backed key/value store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `{dir}/local`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            root_dir: dir.as_ref().join("local"),
        }
    }

    /// Get the file path for a key.
    ///
    /// Keys come from slugs. `[A-Za-z0-9_-]` is kept and every other byte is
    /// written as `%XX`, so distinct keys never share a file and none can
    /// leave the root directory.
    fn path(&self, key: &str) -> PathBuf {
        let mut file = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                file.push(char::from(byte));
            } else {
                let _ = write!(file, "%{byte:02X}");
            }
        }
        self.root_dir.join(format!("{file}.json"))
    }

    /// Write bytes atomically (write to a per-call temp file, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}.{seq}.tmp", std::process::id()));
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write_bytes(key, value.as_bytes()).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
