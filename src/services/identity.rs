// src/services/identity.rs

//! Persisting the client-local user label.

use crate::error::Result;
use crate::models::UserIdentity;
use crate::storage::{KeyValueStore, USER_IDENTITY_KEY, read_cached, write_json};

/// Validate a name, derive an identity and store it.
pub async fn remember(store: &dyn KeyValueStore, name: &str) -> Result<UserIdentity> {
    let user = UserIdentity::new(name)?;
    write_json(store, USER_IDENTITY_KEY, &user).await?;
    log::info!("Remembered user {} ({})", user.name, user.id);
    Ok(user)
}

/// The stored identity, if any. Unreadable entries count as absent.
pub async fn load(store: &dyn KeyValueStore) -> Option<UserIdentity> {
    read_cached(store, USER_IDENTITY_KEY).await
}

pub async fn forget(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(USER_IDENTITY_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn remember_then_load() {
        let store = MemoryStorage::new();
        let user = remember(&store, "  Sam  ").await.unwrap();

        assert_eq!(user.name, "Sam");
        assert_eq!(load(&store).await, Some(user));
    }

    #[tokio::test]
    async fn rejects_long_names_without_storing() {
        let store = MemoryStorage::new();
        let err = remember(&store, &"x".repeat(51)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn forget_clears_identity() {
        let store = MemoryStorage::new();
        remember(&store, "Sam").await.unwrap();
        forget(&store).await.unwrap();
        forget(&store).await.unwrap();

        assert_eq!(load(&store).await, None);
    }
}
