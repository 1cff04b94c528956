// src/pipeline/detail.rs

//! Blog detail pipelines.

use crate::error::{AppError, Result};
use crate::pipeline::Context;
use crate::services::{AnalyticsEvent, BlogDetail, DetailSnapshot, LikeSnapshot};

/// Where a new comment goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Post,
    ReplyTo(i64),
}

async fn open(ctx: &Context, identifier: &str) -> Result<BlogDetail> {
    let detail = BlogDetail::new(ctx.api.clone(), ctx.store.clone()).with_user(ctx.user().await);
    detail.select(identifier).await;
    detail.load().await?;
    Ok(detail)
}

/// Load a post, and its comments when asked.
pub async fn run_show(ctx: &Context, identifier: &str, with_comments: bool) -> Result<DetailSnapshot> {
    let detail = open(ctx, identifier).await?;
    if with_comments {
        detail.open_comments().await?;
    }
    let snapshot = detail.snapshot();

    if let Some(post) = &snapshot.post {
        ctx.track(AnalyticsEvent::new("blog_view").with("blog_id", post.id));
    }
    Ok(snapshot)
}

/// Toggle the remembered user's like on a post.
pub async fn run_like(ctx: &Context, identifier: &str) -> Result<LikeSnapshot> {
    let detail = open(ctx, identifier).await?;
    let result = detail.toggle_like().await?;

    log::info!(
        "{} {} ({} likes)",
        if result.liked { "Liked" } else { "Unliked" },
        identifier,
        result.like_count
    );
    ctx.track(AnalyticsEvent::new("blog_like").with("liked", result.liked));
    Ok(result)
}

/// Post a comment or reply. `Ok(false)` means the server rejected it.
pub async fn run_comment(
    ctx: &Context,
    identifier: &str,
    target: CommentTarget,
    text: &str,
) -> Result<bool> {
    let detail = open(ctx, identifier).await?;
    detail.open_comments().await?;

    let saved = match target {
        CommentTarget::Post => detail.add_comment(text).await?.is_some(),
        CommentTarget::ReplyTo(comment_id) => detail.add_reply(comment_id, text).await?.is_some(),
    };

    if saved {
        ctx.track(AnalyticsEvent::new("blog_comment").with("reply", target != CommentTarget::Post));
    } else {
        log::warn!("Comment on {} was not saved", identifier);
    }
    Ok(saved)
}

/// Fail early with a hint when an action needs a remembered user.
pub async fn require_user(ctx: &Context) -> Result<()> {
    match ctx.user().await {
        Some(_) => Ok(()),
        None => Err(AppError::IdentityRequired),
    }
}
