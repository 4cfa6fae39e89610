// src/handlers/users.rs

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{LoginRequest, SignupRequest, UserListParams},
    services::UsersService,
    utils::jwt::AuthToken,
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and an access token.
pub async fn signup(
    State(service): State<UsersService>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let output = service
        .sign_up(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(output)))
}

/// Authenticates a user and returns an access token.
pub async fn login(
    State(service): State<UsersService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let output = service.login(&payload.email, &payload.password).await?;

    Ok(Json(output))
}

/// Lists users. Admin only.
pub async fn list_users(
    State(service): State<UsersService>,
    AuthToken(token): AuthToken,
    params: Result<Query<UserListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;

    let users = service.get_users(&token, params.q.as_deref()).await?;

    Ok(Json(users))
}
