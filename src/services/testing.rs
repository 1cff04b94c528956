//! Test doubles for the network seams.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::{AppError, Result};
use crate::models::{Author, BlogPost, Comment, CommentDraft, LikeInfo, Reply, UserIdentity};
use crate::services::blog_api::BlogApi;
use crate::services::transport::{HttpReply, HttpRequest, Transport};

/// One scripted transport outcome.
pub(crate) enum Scripted {
    Reply(HttpReply),
    Fail(String),
    Hang,
}

impl Scripted {
    pub(crate) fn json(status: u16, body: Value) -> Self {
        Self::Reply(HttpReply {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn text(status: u16, body: &str) -> Self {
        Self::Reply(HttpReply {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn fail(message: &str) -> Self {
        Self::Fail(message.to_string())
    }
}

/// Transport that plays back a fixed script and records requests.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => Err(AppError::api("scripted", None, message)),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(AppError::api("scripted", None, "script exhausted")),
        }
    }
}

pub(crate) fn post(id: i64, slug: &str, category: &str, date: (i32, u32, u32)) -> BlogPost {
    BlogPost {
        id,
        title: format!("Post {id}"),
        excerpt: format!("Excerpt for {slug}"),
        image: format!("/images/{slug}.jpg"),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        category: category.to_string(),
        slug: slug.to_string(),
        content: Vec::new(),
        likes_count: 10,
        comments_count: 0,
    }
}

pub(crate) fn comment(id: i64, text: &str) -> Comment {
    Comment {
        id,
        author: Author {
            name: "Server".into(),
            image: None,
        },
        text: text.to_string(),
        date: "2024-01-01".into(),
        likes: 0,
        is_liked: false,
        replies: Vec::new(),
        pending: false,
    }
}

/// In-memory backend with failure switches and call counters.
#[derive(Default)]
pub(crate) struct MockBlogApi {
    posts: Vec<BlogPost>,
    comments: Mutex<HashMap<i64, Vec<Comment>>>,
    likes: Mutex<HashMap<i64, LikeInfo>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    next_id: Mutex<i64>,
    pub(crate) fail_likes: AtomicBool,
    pub(crate) fail_comments: AtomicBool,
    pub(crate) fail_writes: AtomicBool,
    /// Post fetches wait for a permit when set
    pub(crate) post_gate: Option<Arc<Notify>>,
    /// Signalled whenever a post fetch starts
    pub(crate) post_entered: Arc<Notify>,
    /// Comment fetches wait for a permit when set
    pub(crate) comments_gate: Option<Arc<Notify>>,
    /// Signalled whenever a comment fetch starts
    pub(crate) comments_entered: Arc<Notify>,
}

impl MockBlogApi {
    pub(crate) fn new(posts: Vec<BlogPost>) -> Self {
        let likes = posts
            .iter()
            .map(|p| {
                (
                    p.id,
                    LikeInfo {
                        liked: false,
                        likes_count: p.likes_count,
                    },
                )
            })
            .collect();
        Self {
            posts,
            likes: Mutex::new(likes),
            next_id: Mutex::new(1000),
            ..Default::default()
        }
    }

    pub(crate) fn with_comments(self, blog_id: i64, comments: Vec<Comment>) -> Self {
        self.comments.lock().unwrap().insert(blog_id, comments);
        self
    }

    pub(crate) fn with_like(self, blog_id: i64, info: LikeInfo) -> Self {
        self.likes.lock().unwrap().insert(blog_id, info);
        self
    }

    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.post_gate = Some(gate);
        self
    }

    pub(crate) fn gated_comments(mut self, gate: Arc<Notify>) -> Self {
        self.comments_gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn record(&self, name: &'static str) {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
    }

    fn fail(name: &str) -> AppError {
        AppError::api(name, Some(503), "mock outage")
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }

    async fn wait_gate(&self) {
        self.post_entered.notify_one();
        if let Some(gate) = &self.post_gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl BlogApi for MockBlogApi {
    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        self.record("list_posts");
        Ok(self.posts.clone())
    }

    async fn post_by_id(&self, id: i64) -> Result<BlogPost> {
        self.record("post_by_id");
        self.wait_gate().await;
        self.posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::api("post_by_id", Some(404), "not found"))
    }

    async fn post_by_slug(&self, slug: &str) -> Result<BlogPost> {
        self.record("post_by_slug");
        self.wait_gate().await;
        self.posts
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| AppError::api("post_by_slug", Some(404), "not found"))
    }

    async fn comments(&self, blog_id: i64) -> Result<Vec<Comment>> {
        self.record("comments");
        self.comments_entered.notify_one();
        if let Some(gate) = &self.comments_gate {
            gate.notified().await;
        }
        if self.fail_comments.load(Ordering::SeqCst) {
            return Err(Self::fail("comments"));
        }
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&blog_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_comment(&self, blog_id: i64, draft: &CommentDraft) -> Result<Comment> {
        self.record("add_comment");
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::fail("add_comment"));
        }
        let mut created = comment(self.next_id(), &draft.text);
        created.author.name = draft.author_name.clone();
        self.comments
            .lock()
            .unwrap()
            .entry(blog_id)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn add_reply(&self, _blog_id: i64, _comment_id: i64, draft: &CommentDraft) -> Result<Reply> {
        self.record("add_reply");
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::fail("add_reply"));
        }
        Ok(Reply {
            id: self.next_id(),
            author: Author {
                name: draft.author_name.clone(),
                image: None,
            },
            text: draft.text.clone(),
            date: "2024-01-02".into(),
            likes: 0,
            is_liked: false,
            pending: false,
        })
    }

    async fn toggle_like(&self, blog_id: i64, _user: &UserIdentity) -> Result<LikeInfo> {
        self.record("toggle_like");
        if self.fail_likes.load(Ordering::SeqCst) {
            return Err(Self::fail("toggle_like"));
        }
        let mut likes = self.likes.lock().unwrap();
        let info = likes.entry(blog_id).or_default();
        info.liked = !info.liked;
        info.likes_count = crate::models::flip_count(info.likes_count, info.liked);
        Ok(*info)
    }

    async fn like_status(&self, blog_id: i64, _user: &UserIdentity) -> Result<LikeInfo> {
        self.record("like_status");
        if self.fail_likes.load(Ordering::SeqCst) {
            return Err(Self::fail("like_status"));
        }
        Ok(self
            .likes
            .lock()
            .unwrap()
            .get(&blog_id)
            .copied()
            .unwrap_or_default())
    }
}
