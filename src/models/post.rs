use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::comment::CommentView;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Post {
    pub id: String,
    pub creator_id: String,
    pub content: String,

    pub comment_count: i64,
    /// Denormalized: number of post reactions with `like = true`.
    pub like_count: i64,
    /// Denormalized: number of post reactions with `like = false`.
    pub dislike_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Net score shown to clients as "likes".
    pub fn net_score(&self) -> i64 {
        self.like_count - self.dislike_count
    }
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,
}

/// DTO for replacing a post's content.
#[derive(Debug, Deserialize, Validate)]
pub struct EditPostRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    /// When present, only this post is returned.
    pub id: Option<String>,
}

/// Author or creator reference embedded in views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorView {
    pub id: String,
    pub name: String,
}

/// A post as listed by `GET /posts`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub comments: i64,
    /// Net score (likes minus dislikes).
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: CreatorView,
}

impl PostView {
    pub fn new(post: Post, creator: CreatorView) -> Self {
        let likes = post.net_score();
        Self {
            id: post.id,
            content: post.content,
            comments: post.comment_count,
            likes,
            created_at: post.created_at,
            updated_at: post.updated_at,
            creator,
        }
    }
}

/// Returned by `POST /posts`. Carries raw counters rather than the net score.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPostView {
    pub id: String,
    pub content: String,
    pub comments: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: CreatorView,
}

/// A post with all of its comments, as returned by `GET /posts/{id}/comments`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailView {
    pub id: String,
    pub content: String,
    pub likes: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: CreatorView,
    pub comments: Vec<CommentView>,
}

/// Plain confirmation body.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
