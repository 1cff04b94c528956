// src/services/blog_api.rs

//! Typed blog endpoints.

use async_trait::async_trait;
use serde_json::json;

use crate::error::Result;
use crate::models::{BlogPost, Comment, CommentDraft, LikeInfo, Reply, UserIdentity};
use crate::services::api::ApiClient;
use crate::services::endpoints::Endpoint;

/// Blog backend operations used by the list and detail views.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<BlogPost>>;

    async fn post_by_id(&self, id: i64) -> Result<BlogPost>;

    async fn post_by_slug(&self, slug: &str) -> Result<BlogPost>;

    async fn comments(&self, blog_id: i64) -> Result<Vec<Comment>>;

    async fn add_comment(&self, blog_id: i64, draft: &CommentDraft) -> Result<Comment>;

    async fn add_reply(&self, blog_id: i64, comment_id: i64, draft: &CommentDraft) -> Result<Reply>;

    /// Flip the user's like and return the resulting server state.
    async fn toggle_like(&self, blog_id: i64, user: &UserIdentity) -> Result<LikeInfo>;

    async fn like_status(&self, blog_id: i64, user: &UserIdentity) -> Result<LikeInfo>;
}

#[async_trait]
impl BlogApi for ApiClient {
    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        self.request(&Endpoint::BlogList, None).await
    }

    async fn post_by_id(&self, id: i64) -> Result<BlogPost> {
        self.request(&Endpoint::BlogById(id), None).await
    }

    async fn post_by_slug(&self, slug: &str) -> Result<BlogPost> {
        self.request(&Endpoint::BlogBySlug(slug.to_string()), None)
            .await
    }

    async fn comments(&self, blog_id: i64) -> Result<Vec<Comment>> {
        self.request(&Endpoint::Comments(blog_id), None).await
    }

    async fn add_comment(&self, blog_id: i64, draft: &CommentDraft) -> Result<Comment> {
        let payload = serde_json::to_value(draft)?;
        self.request(&Endpoint::AddComment(blog_id), Some(&payload))
            .await
    }

    async fn add_reply(&self, blog_id: i64, comment_id: i64, draft: &CommentDraft) -> Result<Reply> {
        let payload = serde_json::to_value(draft)?;
        let endpoint = Endpoint::AddReply {
            blog_id,
            comment_id,
        };
        self.request(&endpoint, Some(&payload)).await
    }

    async fn toggle_like(&self, blog_id: i64, user: &UserIdentity) -> Result<LikeInfo> {
        let payload = json!({ "user_id": user.id, "user_name": user.name });
        self.request(&Endpoint::LikeToggle(blog_id), Some(&payload))
            .await
    }

    async fn like_status(&self, blog_id: i64, user: &UserIdentity) -> Result<LikeInfo> {
        let endpoint = Endpoint::Likes {
            blog_id,
            user_id: user.id.clone(),
        };
        self.request(&endpoint, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiConfig;
    use crate::services::endpoints::Method;
    use crate::services::testing::{Scripted, ScriptedTransport};

    fn client(transport: std::sync::Arc<ScriptedTransport>) -> ApiClient {
        ApiClient::with_transport(&ApiConfig::default(), transport).unwrap()
    }

    #[tokio::test]
    async fn list_posts_decodes_envelope() {
        let transport = ScriptedTransport::new(vec![Scripted::json(
            200,
            json!({"data": [{
                "id": 1, "title": "Hello", "date": "2024-02-02",
                "slug": "hello", "category": "News", "likes_count": 2
            }]}),
        )]);

        let posts = client(transport.clone()).list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "hello");
        assert_eq!(transport.requests()[0].url.path(), "/api/blogs");
    }

    #[tokio::test]
    async fn toggle_like_posts_user() {
        let transport = ScriptedTransport::new(vec![Scripted::json(
            200,
            json!({"liked": true, "likes_count": 5}),
        )]);
        let user = UserIdentity {
            id: "user_1".into(),
            name: "Kim".into(),
        };

        let info = client(transport.clone()).toggle_like(9, &user).await.unwrap();
        assert_eq!(
            info,
            LikeInfo {
                liked: true,
                likes_count: 5
            }
        );

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.path(), "/api/blogs/9/like");
        assert_eq!(request.body.as_ref().unwrap()["user_name"], "Kim");
    }

    #[tokio::test]
    async fn like_status_sends_user_query() {
        let transport = ScriptedTransport::new(vec![Scripted::json(
            200,
            json!({"isLiked": false, "likesCount": 3}),
        )]);
        let user = UserIdentity {
            id: "user_2".into(),
            name: "Jo".into(),
        };

        let info = client(transport.clone()).like_status(4, &user).await.unwrap();
        assert_eq!(info.likes_count, 3);
        assert_eq!(transport.requests()[0].url.query(), Some("user_id=user_2"));
    }
}
