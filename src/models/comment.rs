//! Comment and reply data structures.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::UserIdentity;

/// Who wrote a comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub image: Option<String>,
}

/// A top-level comment on a blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,

    pub author: Author,

    pub text: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub likes: u64,

    /// Liked by this client; never sent by the server
    #[serde(default, rename = "isLiked")]
    pub is_liked: bool,

    #[serde(default)]
    pub replies: Vec<Reply>,

    /// Inserted optimistically, not yet confirmed by the server
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

/// A reply to a comment. Replies do not nest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub id: i64,

    pub author: Author,

    pub text: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub likes: u64,

    #[serde(default, rename = "isLiked")]
    pub is_liked: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

/// Payload for creating a comment or reply.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommentDraft {
    pub author_id: String,
    pub author_name: String,
    pub text: String,
}

impl CommentDraft {
    pub fn new(user: &UserIdentity, text: impl Into<String>) -> Self {
        Self {
            author_id: user.id.clone(),
            author_name: user.name.clone(),
            text: text.into(),
        }
    }
}

impl Comment {
    /// Build a pending comment with a timestamp-based id.
    pub fn optimistic(draft: &CommentDraft) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            author: Author {
                name: draft.author_name.clone(),
                image: None,
            },
            text: draft.text.clone(),
            date: now.format("%Y-%m-%d").to_string(),
            likes: 0,
            is_liked: false,
            replies: Vec::new(),
            pending: true,
        }
    }

    /// Flip the client-local like flag and adjust the counter.
    pub fn toggle_like(&mut self) {
        self.is_liked = !self.is_liked;
        self.likes = flip_count(self.likes, self.is_liked);
    }
}

impl Reply {
    pub fn optimistic(draft: &CommentDraft) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            author: Author {
                name: draft.author_name.clone(),
                image: None,
            },
            text: draft.text.clone(),
            date: now.format("%Y-%m-%d").to_string(),
            likes: 0,
            is_liked: false,
            pending: true,
        }
    }
}

/// Counter after a like flip: up when now liked, down (never below zero) otherwise.
pub fn flip_count(count: u64, liked: bool) -> u64 {
    if liked {
        count.saturating_add(1)
    } else {
        count.saturating_sub(1)
    }
}
