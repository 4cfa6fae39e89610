//! Posts, comments and reactions.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        comment::{Comment, CommentView},
        post::{CreatedPostView, CreatorView, MessageResponse, Post, PostDetailView, PostView},
        reaction::{CommentReaction, PostReaction, ReactionTarget},
        user::User,
    },
    repositories::{PostRepository, ReactionRepository, UserRepository},
    utils::{
        html::clean_html,
        id::IdGenerator,
        jwt::{TokenManager, TokenPayload},
    },
};

/// Business rules for posts. Holds no state of its own beyond its collaborators.
#[derive(Clone)]
pub struct PostsService {
    posts: Arc<dyn PostRepository>,
    reactions: Arc<dyn ReactionRepository>,
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenManager>,
    ids: Arc<dyn IdGenerator>,
}

impl PostsService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        reactions: Arc<dyn ReactionRepository>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenManager>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            posts,
            reactions,
            users,
            tokens,
            ids,
        }
    }

    fn authenticate(&self, token: &str) -> AppResult<TokenPayload> {
        self.tokens
            .payload(token)
            .ok_or_else(|| AppError::bad_request("Invalid token."))
    }

    async fn existing_user(&self, id: &str) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found."))
    }

    async fn existing_post(&self, id: &str) -> AppResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found."))
    }

    /// The comment must exist and hang off `post_id`.
    async fn existing_comment(&self, post_id: &str, comment_id: &str) -> AppResult<Comment> {
        self.posts
            .find_comment(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id)
            .ok_or_else(|| AppError::not_found("Comment not found."))
    }

    /// Sanitizes user text and rejects what is left empty by it.
    fn sanitized(text: &str, empty_message: &str) -> AppResult<String> {
        let cleaned = clean_html(text);
        if cleaned.trim().is_empty() {
            return Err(AppError::bad_request(empty_message));
        }
        Ok(cleaned)
    }

    async fn creator_view(&self, user_id: &str) -> AppResult<CreatorView> {
        let user = self.existing_user(user_id).await?;
        Ok(CreatorView {
            id: user.id,
            name: user.name,
        })
    }

    /// Lists every post, or only `post_id` when given. Likes are reported as net score.
    pub async fn list_posts(&self, token: &str, post_id: Option<&str>) -> AppResult<Vec<PostView>> {
        self.authenticate(token)?;

        let posts = match post_id {
            Some(id) => vec![self.existing_post(id).await?],
            None => self.posts.find_all().await?,
        };

        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            let creator = self.creator_view(&post.creator_id).await?;
            views.push(PostView::new(post, creator));
        }

        Ok(views)
    }

    pub async fn create_post(&self, token: &str, content: &str) -> AppResult<CreatedPostView> {
        let payload = self.authenticate(token)?;
        let user = self.existing_user(&payload.id).await?;

        let content = Self::sanitized(content, "Post content cannot be empty.")?;

        let now = Utc::now();
        let post = Post {
            id: self.ids.generate(),
            creator_id: user.id.clone(),
            content,
            comment_count: 0,
            like_count: 0,
            dislike_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.posts.create(&post).await?;
        tracing::info!(post_id = %post.id, creator_id = %post.creator_id, "Post created");

        Ok(CreatedPostView {
            id: post.id,
            content: post.content,
            comments: post.comment_count,
            likes: post.like_count,
            dislikes: post.dislike_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            creator: CreatorView {
                id: user.id,
                name: user.name,
            },
        })
    }

    pub async fn edit_post(
        &self,
        token: &str,
        post_id: &str,
        content: &str,
    ) -> AppResult<MessageResponse> {
        let payload = self.authenticate(token)?;
        let user = self.existing_user(&payload.id).await?;
        let mut post = self.existing_post(post_id).await?;

        if post.creator_id != user.id {
            return Err(AppError::bad_request("Only the post creator can edit it."));
        }

        post.content = Self::sanitized(content, "Post content cannot be empty.")?;
        post.updated_at = Utc::now();
        self.posts.update_content(&post).await?;
        tracing::info!(post_id = %post.id, "Post edited");

        Ok(MessageResponse::new("Post edited."))
    }

    /// Deletes the post along with its comments and reactions.
    pub async fn delete_post(&self, token: &str, post_id: &str) -> AppResult<MessageResponse> {
        let payload = self.authenticate(token)?;
        let post = self.existing_post(post_id).await?;

        if post.creator_id != payload.id {
            return Err(AppError::bad_request("Only the post creator can delete it."));
        }

        self.posts.delete(&post.id).await?;
        tracing::info!(post_id = %post.id, "Post deleted");

        Ok(MessageResponse::new("Post deleted."))
    }

    /// Toggles the caller's like/dislike on a post and returns what happened.
    pub async fn like_post(&self, token: &str, post_id: &str, like: bool) -> AppResult<String> {
        let payload = self.authenticate(token)?;
        let user = self.existing_user(&payload.id).await?;
        let post = self.existing_post(post_id).await?;

        if post.creator_id == user.id {
            return Err(AppError::bad_request("Creators can't like their own post."));
        }

        let change = self.reactions.react_to_post(&user.id, &post.id, like).await?;
        tracing::debug!(post_id = %post.id, user_id = %user.id, ?change, "Post reaction applied");

        Ok(change.message(ReactionTarget::Post))
    }

    /// The caller's own reaction rows on a post (zero or one).
    pub async fn get_post_likes(&self, token: &str, post_id: &str) -> AppResult<Vec<PostReaction>> {
        let payload = self.authenticate(token)?;
        let post = self.existing_post(post_id).await?;

        self.reactions.find_post_reactions(&payload.id, &post.id).await
    }

    pub async fn comment_post(
        &self,
        token: &str,
        post_id: &str,
        text: &str,
    ) -> AppResult<MessageResponse> {
        let payload = self.authenticate(token)?;
        let user = self.existing_user(&payload.id).await?;
        let post = self.existing_post(post_id).await?;

        let content = Self::sanitized(text, "Comment cannot be empty.")?;

        let now = Utc::now();
        let comment = Comment {
            id: self.ids.generate(),
            post_id: post.id,
            user_id: user.id,
            content,
            like_count: 0,
            dislike_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.posts.add_comment(&comment).await?;
        tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "Comment created");

        Ok(MessageResponse::new("Commented in this post."))
    }

    /// A post with its creator and every comment, each comment with its author and net score.
    pub async fn get_post_detail(&self, token: &str, post_id: &str) -> AppResult<PostDetailView> {
        self.authenticate(token)?;
        let post = self.existing_post(post_id).await?;

        let comments = self.posts.find_comments(&post.id).await?;
        let mut comment_views = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = self.creator_view(&comment.user_id).await?;
            comment_views.push(CommentView::new(comment, author));
        }

        let creator = self.creator_view(&post.creator_id).await?;
        let likes = post.net_score();

        Ok(PostDetailView {
            id: post.id,
            content: post.content,
            likes,
            comment_count: post.comment_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            creator,
            comments: comment_views,
        })
    }

    /// Same toggle rules as [`PostsService::like_post`]. Authors may react to their own comments.
    pub async fn like_comment(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
        like: bool,
    ) -> AppResult<String> {
        let payload = self.authenticate(token)?;
        let user = self.existing_user(&payload.id).await?;
        let post = self.existing_post(post_id).await?;
        let comment = self.existing_comment(&post.id, comment_id).await?;

        let change = self
            .reactions
            .react_to_comment(&user.id, &comment.id, like)
            .await?;
        tracing::debug!(comment_id = %comment.id, user_id = %user.id, ?change, "Comment reaction applied");

        Ok(change.message(ReactionTarget::Comment))
    }

    /// The caller's own reaction rows on a comment (zero or one).
    pub async fn get_comment_likes(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
    ) -> AppResult<Vec<CommentReaction>> {
        let payload = self.authenticate(token)?;
        let post = self.existing_post(post_id).await?;
        let comment = self.existing_comment(&post.id, comment_id).await?;

        self.reactions
            .find_comment_reactions(&payload.id, &comment.id)
            .await
    }
}
