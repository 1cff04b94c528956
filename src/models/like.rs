//! Like state for a (user, blog) pair.

use serde::{Deserialize, Serialize};

/// Authoritative like state returned by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LikeInfo {
    #[serde(alias = "isLiked", alias = "hasLiked")]
    pub liked: bool,

    #[serde(alias = "likesCount", alias = "likes")]
    pub likes_count: u64,
}

/// Where the like state of the current view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikePhase {
    /// Nothing known beyond the local cache
    #[default]
    Unknown,
    /// Server state applied
    Fetched,
    /// Local flip sent, awaiting the server
    OptimisticPending,
    /// Toggle resolved, confirmed or rolled back
    Settled,
}
