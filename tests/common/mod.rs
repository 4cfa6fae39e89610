// tests/common/mod.rs
//
// Fixtures shared by the service tests: a seeded in-memory store and fake
// token/id collaborators keyed on well-known mock values.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use chrono::{Duration, Utc};
use posts_backend::{
    error::AppError,
    models::{
        comment::Comment,
        post::Post,
        reaction::{CommentReaction, PostReaction},
        user::{Role, User},
    },
    repositories::MemoryStore,
    services::{PostsService, UsersService},
    utils::{
        id::IdGenerator,
        jwt::{TokenManager, TokenPayload},
    },
};

pub const USER_TOKEN: &str = "token-mock-user";
pub const ADMIN_TOKEN: &str = "token-mock-admin";
/// Decodes fine but points at a user that does not exist.
pub const GHOST_TOKEN: &str = "token-mock-test-error";
/// Does not decode at all.
pub const BAD_TOKEN: &str = "token-mock-error";

/// Maps the mock tokens above to payloads; anything else is invalid.
pub struct FakeTokens;

impl TokenManager for FakeTokens {
    fn create_token(&self, payload: &TokenPayload) -> Result<String, AppError> {
        Ok(format!("token-{}", payload.id.trim_start_matches("id-")))
    }

    fn payload(&self, token: &str) -> Option<TokenPayload> {
        let (id, name, role) = match token {
            USER_TOKEN => ("id-mock-user", "Test User", Role::Normal),
            ADMIN_TOKEN => ("id-mock-admin", "Test Admin", Role::Admin),
            GHOST_TOKEN => ("id-mock-test-error", "Ghost", Role::Normal),
            _ => return None,
        };
        Some(TokenPayload {
            id: id.to_string(),
            name: name.to_string(),
            role,
        })
    }
}

/// Yields "id-mock", then "id-mock-2", "id-mock-3", ...
#[derive(Default)]
pub struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        match self.next.fetch_add(1, Ordering::SeqCst) {
            0 => "id-mock".to_string(),
            n => format!("id-mock-{}", n + 1),
        }
    }
}

pub fn user(id: &str, name: &str, email: &str, role: Role, password: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: role.as_str().to_string(),
        created_at: Utc::now(),
    }
}

fn post(id: &str, creator_id: &str, content: &str, counts: (i64, i64, i64), age: i64) -> Post {
    let at = Utc::now() - Duration::minutes(age);
    Post {
        id: id.to_string(),
        creator_id: creator_id.to_string(),
        content: content.to_string(),
        comment_count: counts.0,
        like_count: counts.1,
        dislike_count: counts.2,
        created_at: at,
        updated_at: at,
    }
}

fn comment(id: &str, post_id: &str, user_id: &str, content: &str, counts: (i64, i64)) -> Comment {
    let at = Utc::now() - Duration::minutes(1);
    Comment {
        id: id.to_string(),
        post_id: post_id.to_string(),
        user_id: user_id.to_string(),
        content: content.to_string(),
        like_count: counts.0,
        dislike_count: counts.1,
        created_at: at,
        updated_at: at,
    }
}

/// Two users, three posts, two comments on post02 and a few reactions.
///
/// * admin liked post01, user disliked post02
/// * admin disliked comment01, admin liked comment02
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();

    store
        .seed_user(user(
            "id-mock-admin",
            "Test Admin",
            "testadmin@email.com",
            Role::Admin,
            "unused",
        ))
        .unwrap();
    store
        .seed_user(user(
            "id-mock-user",
            "Test User",
            "testuser@email.com",
            Role::Normal,
            "unused",
        ))
        .unwrap();

    store
        .seed_post(post("id-mock-post01", "id-mock-user", "Content mock first post.", (0, 1, 0), 30))
        .unwrap();
    store
        .seed_post(post("id-mock-post02", "id-mock-admin", "Content mock second post.", (2, 0, 1), 20))
        .unwrap();
    store
        .seed_post(post("id-mock-post03", "id-mock-admin", "Content mock third post.", (0, 0, 0), 10))
        .unwrap();

    store
        .seed_comment(comment(
            "id-mock-comment01",
            "id-mock-post02",
            "id-mock-user",
            "Content mock first comment second post.",
            (0, 1),
        ))
        .unwrap();
    store
        .seed_comment(comment(
            "id-mock-comment02",
            "id-mock-post02",
            "id-mock-user",
            "Content mock second comment second post.",
            (1, 0),
        ))
        .unwrap();

    store
        .seed_post_reaction(PostReaction {
            user_id: "id-mock-admin".to_string(),
            post_id: "id-mock-post01".to_string(),
            like: true,
        })
        .unwrap();
    store
        .seed_post_reaction(PostReaction {
            user_id: "id-mock-user".to_string(),
            post_id: "id-mock-post02".to_string(),
            like: false,
        })
        .unwrap();
    store
        .seed_comment_reaction(CommentReaction {
            user_id: "id-mock-admin".to_string(),
            comment_id: "id-mock-comment01".to_string(),
            like: false,
        })
        .unwrap();
    store
        .seed_comment_reaction(CommentReaction {
            user_id: "id-mock-admin".to_string(),
            comment_id: "id-mock-comment02".to_string(),
            like: true,
        })
        .unwrap();

    Arc::new(store)
}

pub fn posts_service(store: &Arc<MemoryStore>) -> PostsService {
    PostsService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(FakeTokens),
        Arc::new(SequentialIds::default()),
    )
}

pub fn users_service(store: &Arc<MemoryStore>) -> UsersService {
    UsersService::new(
        store.clone(),
        Arc::new(FakeTokens),
        Arc::new(SequentialIds::default()),
    )
}

/// Asserts a `BadRequest` carrying exactly `expected`.
#[track_caller]
pub fn assert_bad_request<T: std::fmt::Debug>(result: Result<T, AppError>, expected: &str) {
    match result {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, expected),
        other => panic!("expected BadRequest({expected:?}), got {other:?}"),
    }
}

/// Asserts a `NotFound` carrying exactly `expected`.
#[track_caller]
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, AppError>, expected: &str) {
    match result {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, expected),
        other => panic!("expected NotFound({expected:?}), got {other:?}"),
    }
}
