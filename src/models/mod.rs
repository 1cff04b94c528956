// src/models/mod.rs

//! Domain models for the blog client.
//!
//! Plain data: posts, comments, likes, the local user label, form payloads
//! and configuration.

mod captcha;
mod comment;
mod config;
mod form;
mod like;
mod post;
mod user;

// Re-export all public types
pub use captcha::{CaptchaState, CaptchaToken};
pub use comment::{Author, Comment, CommentDraft, Reply, flip_count};
pub use config::{AnalyticsConfig, ApiConfig, BlogConfig, Config, FormsConfig};
pub use form::{ContactForm, FieldError, NewsletterForm, is_valid_email};
pub use like::{LikeInfo, LikePhase};
pub use post::{BlogPost, ContentSection};
pub use user::{MAX_NAME_LENGTH, UserIdentity};
