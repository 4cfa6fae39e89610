use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        comment::CreateCommentRequest,
        post::{CreatePostRequest, EditPostRequest, PostListParams},
        reaction::ReactionRequest,
    },
    services::PostsService,
    utils::jwt::AuthToken,
};

/// List posts, or a single one with `?id=`.
pub async fn list_posts(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    params: Result<Query<PostListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;

    let posts = service.list_posts(&token, params.id.as_deref()).await?;

    Ok(Json(posts))
}

/// Create a new post.
pub async fn create_post(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let post = service.create_post(&token, &payload.content).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Replace a post's content. Creator only.
pub async fn edit_post(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path(id): Path<String>,
    payload: Result<Json<EditPostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let message = service.edit_post(&token, &id, &payload.content).await?;

    Ok(Json(message))
}

/// Delete a post. Creator only.
pub async fn delete_post(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let message = service.delete_post(&token, &id).await?;

    Ok(Json(message))
}

/// Like or dislike a post. Re-sending the same value removes the reaction.
pub async fn like_post(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path(id): Path<String>,
    payload: Result<Json<ReactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let status = service.like_post(&token, &id, payload.like).await?;

    Ok(Json(status))
}

/// The caller's reaction on a post.
pub async fn get_post_likes(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let reactions = service.get_post_likes(&token, &id).await?;

    Ok(Json(reactions))
}

/// A post with all of its comments.
pub async fn get_post_detail(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail = service.get_post_detail(&token, &id).await?;

    Ok(Json(detail))
}

/// Comment on a post.
pub async fn comment_post(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path(id): Path<String>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let message = service.comment_post(&token, &id, &payload.comment).await?;

    Ok(Json(message))
}

/// Like or dislike a comment.
pub async fn like_comment(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path((post_id, comment_id)): Path<(String, String)>,
    payload: Result<Json<ReactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let status = service
        .like_comment(&token, &post_id, &comment_id, payload.like)
        .await?;

    Ok(Json(status))
}

/// The caller's reaction on a comment.
pub async fn get_comment_likes(
    State(service): State<PostsService>,
    AuthToken(token): AuthToken,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let reactions = service
        .get_comment_likes(&token, &post_id, &comment_id)
        .await?;

    Ok(Json(reactions))
}
