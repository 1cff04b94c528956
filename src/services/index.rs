// src/services/index.rs

//! Blog list page state.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::models::BlogPost;
use crate::services::blog_api::BlogApi;
use crate::services::filter::{Page, PostFilter, categories, paginate};

/// Fetches the post list once and serves filtered pages from memory.
pub struct BlogIndex {
    api: Arc<dyn BlogApi>,
    page_size: usize,
    posts: OnceCell<Vec<BlogPost>>,
}

impl BlogIndex {
    pub fn new(api: Arc<dyn BlogApi>, page_size: usize) -> Self {
        Self {
            api,
            page_size,
            posts: OnceCell::new(),
        }
    }

    /// All posts. Concurrent callers share one fetch; a failed fetch is retried on the next call.
    pub async fn posts(&self) -> Result<&[BlogPost]> {
        let posts = self
            .posts
            .get_or_try_init(|| async {
                let posts = self.api.list_posts().await?;
                log::info!("Fetched {} blog posts", posts.len());
                Ok::<_, crate::error::AppError>(posts)
            })
            .await?;
        Ok(posts)
    }

    /// One page of posts passing `filter`, newest first.
    pub async fn view(&self, filter: &PostFilter, page: usize, today: NaiveDate) -> Result<Page<BlogPost>> {
        let posts = self.posts().await?;
        let matched: Vec<BlogPost> = filter.apply(posts, today).into_iter().cloned().collect();
        Ok(paginate(&matched, page, self.page_size))
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        Ok(categories(self.posts().await?))
    }
}
