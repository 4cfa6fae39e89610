//! PostgreSQL implementation of the repository traits.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::{
    error::AppError,
    models::{
        comment::Comment,
        post::Post,
        reaction::{CommentReaction, PostReaction, ReactionChange},
        user::User,
    },
    repositories::{PostRepository, ReactionRepository, RepoResult, UserRepository},
};

/// Where the reactions of one target kind live, and which row carries their counters.
struct ReactionTable {
    reactions: &'static str,
    target_column: &'static str,
    parent: &'static str,
    missing: &'static str,
}

const POST_REACTIONS: ReactionTable = ReactionTable {
    reactions: "post_reactions",
    target_column: "post_id",
    parent: "posts",
    missing: "Post not found.",
};

const COMMENT_REACTIONS: ReactionTable = ReactionTable {
    reactions: "comment_reactions",
    target_column: "comment_id",
    parent: "comments",
    missing: "Comment not found.",
};

/// sqlx-backed store shared by all three repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn react(
        &self,
        table: &ReactionTable,
        user_id: &str,
        target_id: &str,
        like: bool,
    ) -> RepoResult<ReactionChange> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the parent serializes concurrent reactions on the same target.
        let lock_sql = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", table.parent);
        sqlx::query_scalar::<_, String>(&lock_sql)
            .bind(target_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(table.missing))?;

        let existing_sql = format!(
            "SELECT is_like FROM {} WHERE user_id = $1 AND {} = $2",
            table.reactions, table.target_column
        );
        let existing = sqlx::query_scalar::<_, bool>(&existing_sql)
            .bind(user_id)
            .bind(target_id)
            .fetch_optional(&mut *tx)
            .await?;

        let change = ReactionChange::resolve(existing, like);

        let write_sql = match (existing, change.resulting()) {
            (None, Some(_)) => format!(
                "INSERT INTO {} (user_id, {}, is_like) VALUES ($1, $2, $3)",
                table.reactions, table.target_column
            ),
            (Some(_), Some(_)) => format!(
                "UPDATE {} SET is_like = $3 WHERE user_id = $1 AND {} = $2",
                table.reactions, table.target_column
            ),
            _ => format!(
                "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
                table.reactions, table.target_column
            ),
        };
        let mut write = sqlx::query(&write_sql).bind(user_id).bind(target_id);
        if let Some(value) = change.resulting() {
            write = write.bind(value);
        }
        write.execute(&mut *tx).await?;

        let recount_sql = format!(
            r#"
            UPDATE {parent} SET
                like_count = (SELECT COUNT(*) FROM {reactions} WHERE {target} = $1 AND is_like),
                dislike_count = (SELECT COUNT(*) FROM {reactions} WHERE {target} = $1 AND NOT is_like)
            WHERE id = $1
            "#,
            parent = table.parent,
            reactions = table.reactions,
            target = table.target_column,
        );
        sqlx::query(&recount_sql)
            .bind(target_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(change)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, role, created_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation())
            {
                AppError::bad_request("User already registered, try another one.")
            } else {
                AppError::from(e)
            }
        })?;

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT
                id, creator_id, content,
                comment_count, like_count, dislike_count,
                created_at, updated_at
            FROM posts
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT
                id, creator_id, content,
                comment_count, like_count, dislike_count,
                created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create(&self, post: &Post) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, creator_id, content,
                comment_count, like_count, dislike_count,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&post.id)
        .bind(&post.creator_id)
        .bind(&post.content)
        .bind(post.comment_count)
        .bind(post.like_count)
        .bind(post.dislike_count)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn update_content(&self, post: &Post) -> RepoResult<()> {
        sqlx::query("UPDATE posts SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(&post.id)
            .bind(&post.content)
            .bind(post.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> RepoResult<()> {
        // Comments and reactions go with it through ON DELETE CASCADE.
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_comments(&self, post_id: &str) -> RepoResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT
                id, post_id, user_id, content,
                like_count, dislike_count,
                created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    #[instrument(skip(self))]
    async fn find_comment(&self, comment_id: &str) -> RepoResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT
                id, post_id, user_id, content,
                like_count, dislike_count,
                created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id, post_id = %comment.post_id))]
    async fn add_comment(&self, comment: &Comment) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO comments (
                id, post_id, user_id, content,
                like_count, dislike_count,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.user_id)
        .bind(&comment.content)
        .bind(comment.like_count)
        .bind(comment.dislike_count)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(&comment.post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl ReactionRepository for PgStore {
    #[instrument(skip(self))]
    async fn find_post_reactions(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> RepoResult<Vec<PostReaction>> {
        let reactions = sqlx::query_as::<_, PostReaction>(
            r#"
            SELECT user_id, post_id, is_like
            FROM post_reactions
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reactions)
    }

    #[instrument(skip(self))]
    async fn find_comment_reactions(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> RepoResult<Vec<CommentReaction>> {
        let reactions = sqlx::query_as::<_, CommentReaction>(
            r#"
            SELECT user_id, comment_id, is_like
            FROM comment_reactions
            WHERE user_id = $1 AND comment_id = $2
            "#,
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reactions)
    }

    #[instrument(skip(self))]
    async fn react_to_post(
        &self,
        user_id: &str,
        post_id: &str,
        like: bool,
    ) -> RepoResult<ReactionChange> {
        self.react(&POST_REACTIONS, user_id, post_id, like).await
    }

    #[instrument(skip(self))]
    async fn react_to_comment(
        &self,
        user_id: &str,
        comment_id: &str,
        like: bool,
    ) -> RepoResult<ReactionChange> {
        self.react(&COMMENT_REACTIONS, user_id, comment_id, like).await
    }
}
