//! In-process store used when no database is configured, and by the tests.
//!
//! Rows are kept in insertion order, which is the order listings return.
//! Every repository call takes the single lock once, so multi-step writes are
//! atomic just like their transactional PostgreSQL counterparts.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        comment::Comment,
        post::Post,
        reaction::{CommentReaction, PostReaction, ReactionChange, ReactionCounts},
        user::User,
    },
    repositories::{PostRepository, ReactionRepository, RepoResult, UserRepository},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    post_reactions: Vec<PostReaction>,
    comment_reactions: Vec<CommentReaction>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> RepoResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store lock poisoned".to_string()))
    }

    // Seeding helpers. They bypass validation and never recount, so seeded
    // counters are taken as given.

    pub fn seed_user(&self, user: User) -> RepoResult<()> {
        self.tables()?.users.push(user);
        Ok(())
    }

    pub fn seed_post(&self, post: Post) -> RepoResult<()> {
        self.tables()?.posts.push(post);
        Ok(())
    }

    pub fn seed_comment(&self, comment: Comment) -> RepoResult<()> {
        self.tables()?.comments.push(comment);
        Ok(())
    }

    pub fn seed_post_reaction(&self, reaction: PostReaction) -> RepoResult<()> {
        self.tables()?.post_reactions.push(reaction);
        Ok(())
    }

    pub fn seed_comment_reaction(&self, reaction: CommentReaction) -> RepoResult<()> {
        self.tables()?.comment_reactions.push(reaction);
        Ok(())
    }

    /// Number of reaction rows currently stored for a post.
    pub fn post_reaction_count(&self, post_id: &str) -> RepoResult<usize> {
        Ok(self
            .tables()?
            .post_reactions
            .iter()
            .filter(|r| r.post_id == post_id)
            .count())
    }
}

/// Applies `change` to the reaction held at `position` (if any), inserting with `insert` otherwise.
fn apply_change<R>(
    rows: &mut Vec<R>,
    position: Option<usize>,
    change: ReactionChange,
    set_like: impl Fn(&mut R, bool),
    insert: impl FnOnce(bool) -> R,
) {
    match (position, change.resulting()) {
        (Some(index), Some(value)) => set_like(&mut rows[index], value),
        (Some(index), None) => {
            rows.remove(index);
        }
        (None, Some(value)) => rows.push(insert(value)),
        (None, None) => {}
    }
}

fn count(likes: impl Iterator<Item = bool>) -> ReactionCounts {
    likes.fold(ReactionCounts::default(), |mut counts, like| {
        if like {
            counts.likes += 1;
        } else {
            counts.dislikes += 1;
        }
        counts
    })
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        Ok(self.tables()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.tables()?.users.clone())
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut tables = self.tables()?;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email)
        {
            return Err(AppError::bad_request(
                "User already registered, try another one.",
            ));
        }
        tables.users.push(user.clone());
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_all(&self) -> RepoResult<Vec<Post>> {
        Ok(self.tables()?.posts.clone())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Post>> {
        Ok(self.tables()?.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, post: &Post) -> RepoResult<()> {
        self.tables()?.posts.push(post.clone());
        Ok(())
    }

    async fn update_content(&self, post: &Post) -> RepoResult<()> {
        let mut tables = self.tables()?;
        if let Some(stored) = tables.posts.iter_mut().find(|p| p.id == post.id) {
            stored.content = post.content.clone();
            stored.updated_at = post.updated_at;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let mut tables = self.tables()?;
        let Tables {
            posts,
            comments,
            post_reactions,
            comment_reactions,
            ..
        } = &mut *tables;

        let removed_comments: Vec<String> = comments
            .iter()
            .filter(|c| c.post_id == id)
            .map(|c| c.id.clone())
            .collect();

        posts.retain(|p| p.id != id);
        comments.retain(|c| c.post_id != id);
        post_reactions.retain(|r| r.post_id != id);
        comment_reactions.retain(|r| !removed_comments.contains(&r.comment_id));
        Ok(())
    }

    async fn find_comments(&self, post_id: &str) -> RepoResult<Vec<Comment>> {
        Ok(self
            .tables()?
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn find_comment(&self, comment_id: &str) -> RepoResult<Option<Comment>> {
        Ok(self
            .tables()?
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .cloned())
    }

    async fn add_comment(&self, comment: &Comment) -> RepoResult<()> {
        let mut tables = self.tables()?;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == comment.post_id)
            .ok_or_else(|| AppError::not_found("Post not found."))?;
        post.comment_count += 1;
        tables.comments.push(comment.clone());
        Ok(())
    }
}

#[async_trait]
impl ReactionRepository for MemoryStore {
    async fn find_post_reactions(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> RepoResult<Vec<PostReaction>> {
        Ok(self
            .tables()?
            .post_reactions
            .iter()
            .filter(|r| r.user_id == user_id && r.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn find_comment_reactions(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> RepoResult<Vec<CommentReaction>> {
        Ok(self
            .tables()?
            .comment_reactions
            .iter()
            .filter(|r| r.user_id == user_id && r.comment_id == comment_id)
            .cloned()
            .collect())
    }

    async fn react_to_post(
        &self,
        user_id: &str,
        post_id: &str,
        like: bool,
    ) -> RepoResult<ReactionChange> {
        let mut tables = self.tables()?;
        let Tables {
            posts,
            post_reactions,
            ..
        } = &mut *tables;

        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| AppError::not_found("Post not found."))?;

        let position = post_reactions
            .iter()
            .position(|r| r.user_id == user_id && r.post_id == post_id);
        let change = ReactionChange::resolve(position.map(|i| post_reactions[i].like), like);

        apply_change(
            post_reactions,
            position,
            change,
            |row, value| row.like = value,
            |value| PostReaction {
                user_id: user_id.to_string(),
                post_id: post_id.to_string(),
                like: value,
            },
        );

        let counts = count(
            post_reactions
                .iter()
                .filter(|r| r.post_id == post_id)
                .map(|r| r.like),
        );
        post.like_count = counts.likes;
        post.dislike_count = counts.dislikes;

        Ok(change)
    }

    async fn react_to_comment(
        &self,
        user_id: &str,
        comment_id: &str,
        like: bool,
    ) -> RepoResult<ReactionChange> {
        let mut tables = self.tables()?;
        let Tables {
            comments,
            comment_reactions,
            ..
        } = &mut *tables;

        let comment = comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| AppError::not_found("Comment not found."))?;

        let position = comment_reactions
            .iter()
            .position(|r| r.user_id == user_id && r.comment_id == comment_id);
        let change = ReactionChange::resolve(position.map(|i| comment_reactions[i].like), like);

        apply_change(
            comment_reactions,
            position,
            change,
            |row, value| row.like = value,
            |value| CommentReaction {
                user_id: user_id.to_string(),
                comment_id: comment_id.to_string(),
                like: value,
            },
        );

        let counts = count(
            comment_reactions
                .iter()
                .filter(|r| r.comment_id == comment_id)
                .map(|r| r.like),
        );
        comment.like_count = counts.likes;
        comment.dislike_count = counts.dislikes;

        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            creator_id: "creator".to_string(),
            content: "content".to_string(),
            comment_count: 0,
            like_count: 0,
            dislike_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn reacting_keeps_counters_equal_to_rows() {
        let store = MemoryStore::new();
        store.seed_post(post("p1")).unwrap();

        store.react_to_post("a", "p1", true).await.unwrap();
        store.react_to_post("b", "p1", true).await.unwrap();
        store.react_to_post("c", "p1", false).await.unwrap();
        store.react_to_post("a", "p1", false).await.unwrap();

        let stored = PostRepository::find_by_id(&store, "p1").await.unwrap().unwrap();
        assert_eq!((stored.like_count, stored.dislike_count), (1, 2));
        assert_eq!(store.post_reaction_count("p1").unwrap(), 3);

        store.react_to_post("b", "p1", true).await.unwrap();
        let stored = PostRepository::find_by_id(&store, "p1").await.unwrap().unwrap();
        assert_eq!((stored.like_count, stored.dislike_count), (0, 2));
    }

    #[tokio::test]
    async fn reacting_to_a_missing_post_is_not_found() {
        let store = MemoryStore::new();
        let err = store.react_to_post("a", "nope", true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_dependents() {
        let store = MemoryStore::new();
        store.seed_post(post("p1")).unwrap();
        store.seed_post(post("p2")).unwrap();
        let comment = Comment {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            user_id: "a".to_string(),
            content: "hi".to_string(),
            like_count: 0,
            dislike_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.add_comment(&comment).await.unwrap();
        store.react_to_post("a", "p1", true).await.unwrap();
        store.react_to_post("a", "p2", true).await.unwrap();
        store.react_to_comment("b", "c1", true).await.unwrap();

        PostRepository::delete(&store, "p1").await.unwrap();

        assert!(PostRepository::find_by_id(&store, "p1").await.unwrap().is_none());
        assert!(store.find_comment("c1").await.unwrap().is_none());
        assert!(store.find_comment_reactions("b", "c1").await.unwrap().is_empty());
        assert_eq!(store.post_reaction_count("p1").unwrap(), 0);
        assert_eq!(store.post_reaction_count("p2").unwrap(), 1);
    }
}
