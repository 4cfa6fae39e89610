use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repositories::{PostRepository, ReactionRepository, UserRepository},
    services::{PostsService, UsersService},
    utils::{id::IdGenerator, jwt::TokenManager},
};

#[derive(Clone)]
pub struct AppState {
    pub posts: PostsService,
    pub users: UsersService,
    pub config: Config,
}

impl AppState {
    /// Wires both services onto the same collaborators.
    pub fn new<S>(
        store: Arc<S>,
        tokens: Arc<dyn TokenManager>,
        ids: Arc<dyn IdGenerator>,
        config: Config,
    ) -> Self
    where
        S: UserRepository + PostRepository + ReactionRepository + 'static,
    {
        let posts = PostsService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            tokens.clone(),
            ids.clone(),
        );
        let users = UsersService::new(store, tokens, ids);

        Self {
            posts,
            users,
            config,
        }
    }
}

impl FromRef<AppState> for PostsService {
    fn from_ref(state: &AppState) -> Self {
        state.posts.clone()
    }
}

impl FromRef<AppState> for UsersService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}
