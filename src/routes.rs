// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{posts, users},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges the sub-routers (users, posts).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (services and config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let user_routes: Router<AppState> = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login));

    let post_routes: Router<AppState> = Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{id}", put(posts::edit_post).delete(posts::delete_post))
        .route(
            "/posts/{id}/like",
            get(posts::get_post_likes).post(posts::like_post),
        )
        .route(
            "/posts/{id}/comments",
            get(posts::get_post_detail).post(posts::comment_post),
        )
        .route(
            "/posts/{id}/comments/{comment_id}",
            get(posts::get_comment_likes).post(posts::like_comment),
        );

    Router::new()
        .merge(user_routes)
        .merge(post_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
