//! Service layer for the blog client.
//!
//! This module contains the business logic for:
//! - HTTP access with relaxed retry (`ApiClient`)
//! - Blog list filtering and pagination (`BlogIndex`, `PostFilter`)
//! - Blog detail like/comment sync (`BlogDetail`)
//! - Contact and newsletter forms (`FormSubmitter`)
//! - Usage events (`Analytics`)

pub mod analytics;
pub mod api;
pub mod blog_api;
pub mod detail;
pub mod endpoints;
pub mod filter;
pub mod forms;
pub mod identity;
pub mod index;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use analytics::{Analytics, AnalyticsEvent};
pub use api::{ApiClient, ApiResponse, RequestOptions};
pub use blog_api::BlogApi;
pub use detail::{BlogDetail, BlogKey, DetailSnapshot, LikeSnapshot, LoadState};
pub use endpoints::{Endpoint, Method};
pub use filter::{ALL_CATEGORIES, Page, PostFilter, categories, paginate};
pub use forms::{FormOutcome, FormSubmitter};
pub use index::BlogIndex;
pub use transport::{HttpReply, HttpRequest, ReqwestTransport, RequestMode, Transport};
