// src/pipeline/posts.rs

//! Blog list pipelines.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::Result;
use crate::models::BlogPost;
use crate::pipeline::Context;
use crate::services::{AnalyticsEvent, BlogIndex, Page, PostFilter};

/// Fetch the list and return one filtered page.
pub async fn run_posts(
    ctx: &Context,
    filter: &PostFilter,
    page: usize,
    today: NaiveDate,
) -> Result<Page<BlogPost>> {
    let index = BlogIndex::new(ctx.api.clone(), ctx.config.blog.page_size);
    let result = index.view(filter, page, today).await?;

    log::info!(
        "Page {}/{}: {} of {} matching posts",
        result.page,
        result.total_pages,
        result.items.len(),
        result.total_items
    );

    let mut event = AnalyticsEvent::new("blog_list_view").with("page", result.page);
    if let Some(category) = &filter.category {
        event = event.with("category", category.as_str());
    }
    ctx.track(event);

    Ok(result)
}

/// Like count for one post.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LikeRow {
    pub id: i64,
    pub slug: String,
    pub likes_count: u64,
    /// Only known when a user is remembered
    pub liked: Option<bool>,
}

/// Like counts for every post.
///
/// With a remembered user the per-post status is fetched concurrently, at
/// most `blog.max_concurrent` at a time. Failed lookups fall back to the
/// count in the list response.
pub async fn run_like_counts(ctx: &Context) -> Result<Vec<LikeRow>> {
    let index = BlogIndex::new(ctx.api.clone(), ctx.config.blog.page_size);
    let posts = index.posts().await?;

    let rows_from_list = |post: &BlogPost| LikeRow {
        id: post.id,
        slug: post.slug.clone(),
        likes_count: post.likes_count,
        liked: None,
    };

    let Some(user) = ctx.user().await else {
        log::info!("No remembered user; using list counts");
        return Ok(posts.iter().map(rows_from_list).collect());
    };

    let concurrency = ctx.config.blog.max_concurrent.max(1);
    let mut failures = 0usize;
    let mut rows = Vec::with_capacity(posts.len());

    let mut status_stream = stream::iter(posts)
        .map(|post| {
            let user = &user;
            async move { (post, ctx.api.like_status(post.id, user).await) }
        })
        .buffer_unordered(concurrency);

    while let Some((post, result)) = status_stream.next().await {
        match result {
            Ok(info) => rows.push(LikeRow {
                id: post.id,
                slug: post.slug.clone(),
                likes_count: info.likes_count,
                liked: Some(info.liked),
            }),
            Err(e) => {
                failures += 1;
                log::warn!("Failed to fetch likes for {}: {}", post.slug, e);
                rows.push(rows_from_list(post));
            }
        }
    }

    if failures > 0 {
        log::warn!("{} of {} like lookups failed", failures, posts.len());
    }

    rows.sort_by_key(|row| row.id);
    Ok(rows)
}
