// src/services/detail.rs

//! Blog detail view: post load, likes and comments.
//!
//! One `BlogDetail` backs one detail view. Mutations are applied to local
//! state first, mirrored into the key/value store, and then reconciled with
//! the server: the server's answer wins, a failed call rolls the local
//! change back.
//!
//! Every request takes a ticket (generation + cancellation token) when it
//! starts. Selecting another post or closing the view cancels the token
//! and bumps the generation, so a late response can never write into the
//! state of a different post.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{
    BlogPost, Comment, CommentDraft, LikePhase, Reply, UserIdentity, flip_count,
};
use crate::services::blog_api::BlogApi;
use crate::storage::{KeyValueStore, comments_key, liked_key, read_cached, write_cached};

/// Progress of the post fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// How a route identifier addresses a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlogKey {
    Id(i64),
    Slug(String),
}

impl BlogKey {
    /// Numeric identifiers are ids, everything else is a slug.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Slug(raw.to_string()),
        }
    }
}

/// Like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub liked: bool,
    pub like_count: u64,
    pub phase: LikePhase,
}

/// Read-only copy of the view state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSnapshot {
    pub key: Option<String>,
    pub load: LoadState,
    pub post: Option<BlogPost>,
    pub liked: bool,
    pub like_count: u64,
    pub like_phase: LikePhase,
    pub comments: Vec<Comment>,
    pub comments_loaded: bool,
}

struct DetailState {
    /// Route identifier; also scopes the cache keys
    key: Option<String>,
    generation: u64,
    cancel: CancellationToken,
    load: LoadState,
    post: Option<BlogPost>,
    liked: bool,
    like_count: u64,
    like_phase: LikePhase,
    pending_toggles: usize,
    comments: Vec<Comment>,
    comments_loaded: bool,
    post_fetch_started: bool,
    like_fetch_started: bool,
    comments_fetch_started: bool,
}

impl DetailState {
    fn fresh(key: Option<String>, generation: u64) -> Self {
        Self {
            key,
            generation,
            cancel: CancellationToken::new(),
            load: LoadState::Idle,
            post: None,
            liked: false,
            like_count: 0,
            like_phase: LikePhase::Unknown,
            pending_toggles: 0,
            comments: Vec::new(),
            comments_loaded: false,
            post_fetch_started: false,
            like_fetch_started: false,
            comments_fetch_started: false,
        }
    }

    fn key(&self) -> Result<String> {
        self.key
            .clone()
            .ok_or_else(|| AppError::not_loaded("no blog selected"))
    }

    fn blog_id(&self) -> Result<i64> {
        self.post
            .as_ref()
            .map(|p| p.id)
            .ok_or_else(|| AppError::not_loaded(self.key.clone().unwrap_or_default()))
    }

    fn ticket(&self, key: String) -> Ticket {
        Ticket {
            generation: self.generation,
            cancel: self.cancel.clone(),
            key,
        }
    }
}

/// Identifies the view state a request was issued for.
struct Ticket {
    generation: u64,
    cancel: CancellationToken,
    key: String,
}

/// State and actions of one blog detail view.
pub struct BlogDetail {
    api: Arc<dyn BlogApi>,
    store: Arc<dyn KeyValueStore>,
    user: Mutex<Option<UserIdentity>>,
    state: Mutex<DetailState>,
}

impl BlogDetail {
    pub fn new(api: Arc<dyn BlogApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            store,
            user: Mutex::new(None),
            state: Mutex::new(DetailState::fresh(None, 0)),
        }
    }

    pub fn with_user(self, user: Option<UserIdentity>) -> Self {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = user;
        self
    }

    fn state(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The state, only if it still belongs to the ticket's generation.
    fn current(&self, ticket: &Ticket) -> Option<MutexGuard<'_, DetailState>> {
        let state = self.state();
        (state.generation == ticket.generation).then_some(state)
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.user.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Change the user label. Like status is fetched again on the next refresh.
    pub fn set_user(&self, user: Option<UserIdentity>) {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = user;
        self.state().like_fetch_started = false;
    }

    async fn guarded<T>(ticket: &Ticket, request: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => Err(AppError::Aborted),
            result = request => result,
        }
    }

    /// Point the view at a post. A new identifier cancels in-flight requests and
    /// clears all post, like and comment state before anything is fetched.
    pub async fn select(&self, identifier: &str) {
        let identifier = identifier.trim().to_string();
        let ticket = {
            let mut state = self.state();
            if state.key.as_deref() == Some(identifier.as_str()) {
                return;
            }
            state.cancel.cancel();
            let generation = state.generation + 1;
            *state = DetailState::fresh(Some(identifier.clone()), generation);
            state.ticket(identifier.clone())
        };
        log::debug!("Selected blog {}", identifier);

        let cached: Option<bool> = read_cached(&*self.store, &liked_key(&ticket.key)).await;
        if let Some(liked) = cached {
            if let Some(mut state) = self.current(&ticket) {
                if state.like_phase == LikePhase::Unknown {
                    state.liked = liked;
                }
            }
        }
    }

    /// Unmount the view: cancel requests and forget the selection.
    pub fn close(&self) {
        let mut state = self.state();
        state.cancel.cancel();
        let generation = state.generation + 1;
        *state = DetailState::fresh(None, generation);
    }

    /// Fetch the selected post, then the user's like status.
    ///
    /// Runs at most once per selection; later calls return immediately.
    pub async fn load(&self) -> Result<()> {
        let ticket = {
            let mut state = self.state();
            let key = state.key()?;
            if state.post_fetch_started {
                log::debug!("Post fetch for {} already initiated", key);
                return Ok(());
            }
            state.post_fetch_started = true;
            state.load = LoadState::Loading;
            state.ticket(key)
        };

        let fetch = async {
            match BlogKey::parse(&ticket.key) {
                BlogKey::Id(id) => self.api.post_by_id(id).await,
                BlogKey::Slug(slug) => self.api.post_by_slug(&slug).await,
            }
        };
        let result = Self::guarded(&ticket, fetch).await;

        {
            let Some(mut state) = self.current(&ticket) else {
                log::debug!("Dropping stale post response for {}", ticket.key);
                return Err(AppError::Aborted);
            };
            match result {
                Ok(post) => {
                    if state.like_phase == LikePhase::Unknown {
                        state.like_count = post.likes_count;
                    }
                    log::info!("Loaded blog {} ({})", post.slug, post.id);
                    state.post = Some(post);
                    state.load = LoadState::Loaded;
                }
                Err(e) => {
                    log::warn!("Failed to load blog {}: {}", ticket.key, e);
                    state.load = LoadState::Error(e.to_string());
                    return Err(e);
                }
            }
        }

        self.refresh_like_status().await
    }

    /// Load again after a failed attempt.
    pub async fn retry(&self) -> Result<()> {
        {
            let mut state = self.state();
            if matches!(state.load, LoadState::Error(_)) {
                state.post_fetch_started = false;
            }
        }
        self.load().await
    }

    /// Fetch the authoritative like state when a user is known.
    ///
    /// Failures only log; the cached flag stays in place.
    pub async fn refresh_like_status(&self) -> Result<()> {
        let Some(user) = self.user() else {
            return Ok(());
        };
        let (ticket, blog_id) = {
            let mut state = self.state();
            let (Ok(key), Ok(blog_id)) = (state.key(), state.blog_id()) else {
                return Ok(());
            };
            if state.like_fetch_started {
                return Ok(());
            }
            state.like_fetch_started = true;
            (state.ticket(key), blog_id)
        };

        let result = Self::guarded(&ticket, self.api.like_status(blog_id, &user)).await;

        let liked = {
            let Some(mut state) = self.current(&ticket) else {
                return Err(AppError::Aborted);
            };
            match result {
                Ok(info) if state.pending_toggles == 0 => {
                    state.liked = info.liked;
                    state.like_count = info.likes_count;
                    state.like_phase = LikePhase::Fetched;
                    info.liked
                }
                Ok(_) => {
                    log::debug!("Like toggle pending for blog {}; keeping local state", blog_id);
                    return Ok(());
                }
                Err(e) => {
                    log::warn!("Could not fetch like status for blog {}: {}", blog_id, e);
                    state.like_fetch_started = false;
                    return Ok(());
                }
            }
        };

        write_cached(&*self.store, &liked_key(&ticket.key), &liked).await;
        Ok(())
    }

    /// Flip the like optimistically and confirm with the server.
    ///
    /// A failed call reverts the flip; only missing preconditions are errors.
    pub async fn toggle_like(&self) -> Result<LikeSnapshot> {
        let user = self.user().ok_or(AppError::IdentityRequired)?;
        let (ticket, blog_id, previous, liked) = {
            let mut state = self.state();
            let key = state.key()?;
            let blog_id = state.blog_id()?;
            let previous = (state.liked, state.like_count);
            state.liked = !state.liked;
            state.like_count = flip_count(state.like_count, state.liked);
            state.like_phase = LikePhase::OptimisticPending;
            state.pending_toggles += 1;
            (state.ticket(key), blog_id, previous, state.liked)
        };
        write_cached(&*self.store, &liked_key(&ticket.key), &liked).await;

        let result = Self::guarded(&ticket, self.api.toggle_like(blog_id, &user)).await;

        let settled = {
            self.current(&ticket).map(|mut state| {
                state.pending_toggles = state.pending_toggles.saturating_sub(1);
                match &result {
                    Ok(info) => {
                        state.liked = info.liked;
                        state.like_count = info.likes_count;
                    }
                    Err(e) => {
                        log::warn!("Like toggle for blog {} failed, rolling back: {}", blog_id, e);
                        state.liked = previous.0;
                        state.like_count = previous.1;
                    }
                }
                if state.pending_toggles == 0 {
                    state.like_phase = LikePhase::Settled;
                }
                LikeSnapshot {
                    liked: state.liked,
                    like_count: state.like_count,
                    phase: state.like_phase,
                }
            })
        };

        match settled {
            Some(snapshot) => {
                write_cached(&*self.store, &liked_key(&ticket.key), &snapshot.liked).await;
                Ok(snapshot)
            }
            None => {
                // The view moved on; keep the old post's cache truthful.
                let liked = match &result {
                    Ok(info) => info.liked,
                    Err(_) => previous.0,
                };
                write_cached(&*self.store, &liked_key(&ticket.key), &liked).await;
                Err(AppError::Aborted)
            }
        }
    }

    /// Comments for the comment panel, fetched on first open only.
    ///
    /// Falls back to the cached thread when the server is unreachable.
    pub async fn open_comments(&self) -> Result<Vec<Comment>> {
        let (ticket, blog_id) = {
            let mut state = self.state();
            let key = state.key()?;
            if state.comments_loaded {
                return Ok(state.comments.clone());
            }
            if state.comments_fetch_started {
                return Err(AppError::not_loaded(format!("comments for {key} still loading")));
            }
            let blog_id = state.blog_id()?;
            state.comments_fetch_started = true;
            (state.ticket(key), blog_id)
        };

        let cached: Vec<Comment> = read_cached(&*self.store, &comments_key(&ticket.key))
            .await
            .unwrap_or_default();
        let result = Self::guarded(&ticket, self.api.comments(blog_id)).await;

        let merged = {
            let Some(mut state) = self.current(&ticket) else {
                return Err(AppError::Aborted);
            };
            match result {
                Ok(server) => {
                    log::debug!("Fetched {} comments for blog {}", server.len(), blog_id);
                    state.comments = merge_comments(server, &cached, &state.comments);
                    state.comments_loaded = true;
                    state.comments.clone()
                }
                Err(e) => {
                    log::warn!(
                        "Could not fetch comments for blog {}: {}. Using cached copy",
                        blog_id,
                        e
                    );
                    state.comments_fetch_started = false;
                    if state.comments.is_empty() {
                        state.comments = cached;
                    }
                    return Ok(state.comments.clone());
                }
            }
        };

        write_cached(&*self.store, &comments_key(&ticket.key), &merged).await;
        Ok(merged)
    }

    /// Post a comment optimistically. Returns the saved comment, or `None`
    /// when the server rejected it and the local copy was removed.
    pub async fn add_comment(&self, text: &str) -> Result<Option<Comment>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("comment text is empty"));
        }
        let user = self.user().ok_or(AppError::IdentityRequired)?;
        let draft = CommentDraft::new(&user, text);
        self.seed_comments_from_cache().await?;

        let (ticket, blog_id, temp_id, snapshot) = {
            let mut state = self.state();
            let key = state.key()?;
            let blog_id = state.blog_id()?;
            let mut optimistic = Comment::optimistic(&draft);
            while state.comments.iter().any(|c| c.id == optimistic.id) {
                optimistic.id += 1;
            }
            let temp_id = optimistic.id;
            state.comments.push(optimistic);
            (state.ticket(key), blog_id, temp_id, state.comments.clone())
        };
        write_cached(&*self.store, &comments_key(&ticket.key), &snapshot).await;

        let result = Self::guarded(&ticket, self.api.add_comment(blog_id, &draft)).await;

        let (outcome, snapshot) = {
            let Some(mut state) = self.current(&ticket) else {
                return Err(AppError::Aborted);
            };
            let outcome = match result {
                Ok(mut saved) => {
                    saved.pending = false;
                    match state.comments.iter_mut().find(|c| c.id == temp_id) {
                        Some(slot) => *slot = saved.clone(),
                        None => state.comments.push(saved.clone()),
                    }
                    if let Some(post) = state.post.as_mut() {
                        post.comments_count += 1;
                    }
                    Some(saved)
                }
                Err(e) => {
                    log::warn!("Comment on blog {} failed, rolling back: {}", blog_id, e);
                    state.comments.retain(|c| c.id != temp_id);
                    None
                }
            };
            (outcome, state.comments.clone())
        };

        write_cached(&*self.store, &comments_key(&ticket.key), &snapshot).await;
        Ok(outcome)
    }

    /// Reply to a comment optimistically, like `add_comment`.
    pub async fn add_reply(&self, comment_id: i64, text: &str) -> Result<Option<Reply>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("reply text is empty"));
        }
        let user = self.user().ok_or(AppError::IdentityRequired)?;
        let draft = CommentDraft::new(&user, text);
        self.seed_comments_from_cache().await?;

        let (ticket, blog_id, temp_id, snapshot) = {
            let mut state = self.state();
            let key = state.key()?;
            let blog_id = state.blog_id()?;
            let parent = state
                .comments
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or_else(|| AppError::validation(format!("comment {comment_id} not found")))?;
            let mut optimistic = Reply::optimistic(&draft);
            while parent.replies.iter().any(|r| r.id == optimistic.id) {
                optimistic.id += 1;
            }
            let temp_id = optimistic.id;
            parent.replies.push(optimistic);
            (state.ticket(key), blog_id, temp_id, state.comments.clone())
        };
        write_cached(&*self.store, &comments_key(&ticket.key), &snapshot).await;

        let result = Self::guarded(&ticket, self.api.add_reply(blog_id, comment_id, &draft)).await;

        let (outcome, snapshot) = {
            let Some(mut state) = self.current(&ticket) else {
                return Err(AppError::Aborted);
            };
            let Some(parent) = state.comments.iter_mut().find(|c| c.id == comment_id) else {
                return Ok(None);
            };
            let outcome = match result {
                Ok(mut saved) => {
                    saved.pending = false;
                    match parent.replies.iter_mut().find(|r| r.id == temp_id) {
                        Some(slot) => *slot = saved.clone(),
                        None => parent.replies.push(saved.clone()),
                    }
                    Some(saved)
                }
                Err(e) => {
                    log::warn!("Reply on blog {} failed, rolling back: {}", blog_id, e);
                    parent.replies.retain(|r| r.id != temp_id);
                    None
                }
            };
            (outcome, state.comments.clone())
        };

        write_cached(&*self.store, &comments_key(&ticket.key), &snapshot).await;
        Ok(outcome)
    }

    /// Pull the cached thread into memory before a local edit, so writing
    /// the cache back keeps comments that were never fetched.
    async fn seed_comments_from_cache(&self) -> Result<()> {
        let ticket = {
            let state = self.state();
            let key = state.key()?;
            if state.comments_loaded || !state.comments.is_empty() {
                return Ok(());
            }
            state.ticket(key)
        };

        let cached: Vec<Comment> = read_cached(&*self.store, &comments_key(&ticket.key))
            .await
            .unwrap_or_default();
        if let Some(mut state) = self.current(&ticket) {
            if !state.comments_loaded && state.comments.is_empty() {
                state.comments = cached;
            }
        }
        Ok(())
    }

    /// Flip the client-local like on a comment.
    pub async fn toggle_comment_like(&self, comment_id: i64) -> Result<Option<Comment>> {
        self.seed_comments_from_cache().await?;
        let (key, updated, snapshot) = {
            let mut state = self.state();
            let key = state.key()?;
            let updated = state
                .comments
                .iter_mut()
                .find(|c| c.id == comment_id)
                .map(|c| {
                    c.toggle_like();
                    c.clone()
                });
            (key, updated, state.comments.clone())
        };
        if updated.is_some() {
            write_cached(&*self.store, &comments_key(&key), &snapshot).await;
        }
        Ok(updated)
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        let state = self.state();
        DetailSnapshot {
            key: state.key.clone(),
            load: state.load.clone(),
            post: state.post.clone(),
            liked: state.liked,
            like_count: state.like_count,
            like_phase: state.like_phase,
            comments: state.comments.clone(),
            comments_loaded: state.comments_loaded,
        }
    }
}

impl Drop for BlogDetail {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.cancel.cancel();
    }
}

/// Server comments win; local like flags and unconfirmed comments survive.
fn merge_comments(server: Vec<Comment>, cached: &[Comment], current: &[Comment]) -> Vec<Comment> {
    let liked_ids: Vec<i64> = cached
        .iter()
        .chain(current)
        .filter(|c| c.is_liked)
        .map(|c| c.id)
        .collect();
    let liked_reply_ids: Vec<i64> = cached
        .iter()
        .chain(current)
        .flat_map(|c| &c.replies)
        .filter(|r| r.is_liked)
        .map(|r| r.id)
        .collect();

    let mut merged: Vec<Comment> = server
        .into_iter()
        .map(|mut comment| {
            comment.is_liked = liked_ids.contains(&comment.id);
            for reply in &mut comment.replies {
                reply.is_liked = liked_reply_ids.contains(&reply.id);
            }
            comment
        })
        .collect();

    let pending: Vec<Comment> = current
        .iter()
        .filter(|c| c.pending && !merged.iter().any(|m| m.id == c.id))
        .cloned()
        .collect();
    merged.extend(pending);
    merged
}
