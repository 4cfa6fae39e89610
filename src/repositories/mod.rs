//! Repository traits - the storage interface the services are written against.
//!
//! Services only see these traits. `postgres` backs them with sqlx, `memory`
//! keeps everything in process for local runs and tests.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        comment::Comment,
        post::Post,
        reaction::{CommentReaction, PostReaction, ReactionChange},
        user::User,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result type for repository operations
pub type RepoResult<T> = AppResult<T>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// All users, in store order.
    async fn find_all(&self) -> RepoResult<Vec<User>>;

    async fn create(&self, user: &User) -> RepoResult<()>;
}

// ============================================================================
// Post Repository (posts and their comments)
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, in store order.
    async fn find_all(&self) -> RepoResult<Vec<Post>>;

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Post>>;

    async fn create(&self, post: &Post) -> RepoResult<()>;

    /// Writes the editable fields of `post` (content, updated_at). Counters are
    /// owned by the reaction and comment writes and are left alone.
    async fn update_content(&self, post: &Post) -> RepoResult<()>;

    /// Removes the post together with its comments and every reaction on either.
    async fn delete(&self, id: &str) -> RepoResult<()>;

    /// Comments of a post, in store order.
    async fn find_comments(&self, post_id: &str) -> RepoResult<Vec<Comment>>;

    async fn find_comment(&self, comment_id: &str) -> RepoResult<Option<Comment>>;

    /// Inserts the comment and bumps the parent's comment_count by one, atomically.
    async fn add_comment(&self, comment: &Comment) -> RepoResult<()>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn find_post_reactions(&self, user_id: &str, post_id: &str)
    -> RepoResult<Vec<PostReaction>>;

    async fn find_comment_reactions(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> RepoResult<Vec<CommentReaction>>;

    /// Applies the toggle rules for `user_id` on `post_id`, then recounts the
    /// post's reactions and writes both counters back. The whole sequence is
    /// atomic with respect to other reactions on the same post.
    async fn react_to_post(
        &self,
        user_id: &str,
        post_id: &str,
        like: bool,
    ) -> RepoResult<ReactionChange>;

    /// Same as [`ReactionRepository::react_to_post`] for a comment.
    async fn react_to_comment(
        &self,
        user_id: &str,
        comment_id: &str,
        like: bool,
    ) -> RepoResult<ReactionChange>;
}
