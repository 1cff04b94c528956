// src/services/endpoints.rs

//! REST endpoints consumed by the client.

use std::fmt;

use url::Url;

use crate::error::Result;
use crate::utils::join_segments;

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A backend endpoint with its path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    BlogList,
    BlogById(i64),
    BlogBySlug(String),
    Comments(i64),
    AddComment(i64),
    AddReply { blog_id: i64, comment_id: i64 },
    LikeToggle(i64),
    Likes { blog_id: i64, user_id: String },
    ContactSend,
    NewsletterSubscribe,
    NewsletterUnsubscribe,
    AnalyticsEvent,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Self::BlogList
            | Self::BlogById(_)
            | Self::BlogBySlug(_)
            | Self::Comments(_)
            | Self::Likes { .. } => Method::Get,
            Self::AddComment(_)
            | Self::AddReply { .. }
            | Self::LikeToggle(_)
            | Self::ContactSend
            | Self::NewsletterSubscribe
            | Self::NewsletterUnsubscribe
            | Self::AnalyticsEvent => Method::Post,
        }
    }

    /// Raw path segments relative to the API base URL.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::BlogList => vec!["blogs".into()],
            Self::BlogById(id) => vec!["blogs".into(), id.to_string()],
            Self::BlogBySlug(slug) => vec!["blogs".into(), "slug".into(), slug.clone()],
            Self::Comments(id) | Self::AddComment(id) => {
                vec!["blogs".into(), id.to_string(), "comments".into()]
            }
            Self::AddReply {
                blog_id,
                comment_id,
            } => vec![
                "blogs".into(),
                blog_id.to_string(),
                "comments".into(),
                comment_id.to_string(),
                "replies".into(),
            ],
            Self::LikeToggle(id) => vec!["blogs".into(), id.to_string(), "like".into()],
            Self::Likes { blog_id, .. } => vec!["blogs".into(), blog_id.to_string(), "likes".into()],
            Self::ContactSend => vec!["email".into(), "contact".into()],
            Self::NewsletterSubscribe => vec!["newsletter".into(), "subscribe".into()],
            Self::NewsletterUnsubscribe => vec!["newsletter".into(), "unsubscribe".into()],
            Self::AnalyticsEvent => vec!["analytics".into(), "events".into()],
        }
    }

    /// Path relative to the API base URL, for logs.
    pub fn path(&self) -> String {
        self.segments().join("/")
    }

    /// Full URL, including query parameters.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = join_segments(base, &self.segments())?;
        if let Self::Likes { user_id, .. } = self {
            url.query_pairs_mut().append_pair("user_id", user_id);
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.method() {
            Method::Get => "GET",
            Method::Post => "POST",
        };
        write!(f, "{} /{}", method, self.path())
    }
}
