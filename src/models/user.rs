//! Client-local user identity.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

/// Longest accepted display name.
pub const MAX_NAME_LENGTH: usize = 50;

/// A display label for attributing comments and likes. Not authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
}

impl UserIdentity {
    /// Create an identity from a display name, deriving a fresh id.
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }

        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(nanos.to_le_bytes());
        let digest = hex::encode(hasher.finalize());

        Ok(Self {
            id: format!("user_{}", &digest[..16]),
            name: name.to_string(),
        })
    }
}
