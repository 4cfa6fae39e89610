//! Like/dislike rows and the toggle rules applied when a user reacts.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'post_reactions' table. One row per (user, post).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReaction {
    pub user_id: String,
    pub post_id: String,
    /// `true` for a like, `false` for a dislike.
    #[sqlx(rename = "is_like")]
    pub like: bool,
}

/// Represents the 'comment_reactions' table. One row per (user, comment).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReaction {
    pub user_id: String,
    pub comment_id: String,
    #[sqlx(rename = "is_like")]
    pub like: bool,
}

/// Body of the like/dislike endpoints.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub like: bool,
}

/// What a reaction is attached to. Only affects the wording of messages,
/// rendered as the object of "You liked ...".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Post,
    Comment,
}

impl fmt::Display for ReactionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionTarget::Post => f.write_str("this post"),
            ReactionTarget::Comment => f.write_str("the comment"),
        }
    }
}

/// Outcome of applying a requested reaction on top of the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Liked,
    Disliked,
    RemovedLike,
    RemovedDislike,
    LikeToDislike,
    DislikeToLike,
}

impl ReactionChange {
    /// Toggle rules: the same value again removes the reaction, the opposite
    /// value flips it, and no existing reaction inserts the requested one.
    pub fn resolve(existing: Option<bool>, requested: bool) -> Self {
        match (existing, requested) {
            (Some(true), true) => ReactionChange::RemovedLike,
            (Some(false), false) => ReactionChange::RemovedDislike,
            (Some(true), false) => ReactionChange::LikeToDislike,
            (Some(false), true) => ReactionChange::DislikeToLike,
            (None, true) => ReactionChange::Liked,
            (None, false) => ReactionChange::Disliked,
        }
    }

    /// The reaction stored once the change is applied; `None` means the row is gone.
    pub fn resulting(&self) -> Option<bool> {
        match self {
            ReactionChange::Liked | ReactionChange::DislikeToLike => Some(true),
            ReactionChange::Disliked | ReactionChange::LikeToDislike => Some(false),
            ReactionChange::RemovedLike | ReactionChange::RemovedDislike => None,
        }
    }

    pub fn message(&self, target: ReactionTarget) -> String {
        match self {
            ReactionChange::Liked => format!("You liked {}.", target),
            ReactionChange::Disliked => format!("You disliked {}.", target),
            ReactionChange::RemovedLike => "You removed your like.".to_string(),
            ReactionChange::RemovedDislike => "You removed your dislike.".to_string(),
            ReactionChange::LikeToDislike => "You changed your like to a dislike.".to_string(),
            ReactionChange::DislikeToLike => "You changed your dislike to a like.".to_string(),
        }
    }
}

/// Like and dislike tallies written back onto a post or comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
}
