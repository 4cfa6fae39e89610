use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, TokenResponse, User, UserView},
    repositories::UserRepository,
    utils::{
        hash::{hash_password, verify_password},
        id::IdGenerator,
        jwt::{TokenManager, TokenPayload},
    },
};

/// Emails are stored and looked up lowercased, so stores compare them exactly.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration, login and user listing.
#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenManager>,
    ids: Arc<dyn IdGenerator>,
}

impl UsersService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenManager>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self { users, tokens, ids }
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        self.tokens.create_token(&TokenPayload {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role(),
        })
    }

    /// Creates a user with the given role unless the email is already taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::bad_request(
                "User already registered, try another one.",
            ));
        }

        let user = User {
            id: self.ids.generate(),
            name: name.to_string(),
            email,
            password: hash_password(password)?,
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        };

        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, role = %role, "User registered");

        Ok(user)
    }

    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> AppResult<TokenResponse> {
        let user = self.register(name, email, password, Role::Normal).await?;

        Ok(TokenResponse {
            message: "Successfully registered user.".to_string(),
            token: self.issue_token(&user)?,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenResponse> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AppError::not_found("User not found."))?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::bad_request("Invalid email or password."));
        }

        Ok(TokenResponse {
            message: "Logged in.".to_string(),
            token: self.issue_token(&user)?,
        })
    }

    /// Admin only. Lists every user, or just `user_id` when given.
    pub async fn get_users(&self, token: &str, user_id: Option<&str>) -> AppResult<Vec<UserView>> {
        let payload = self
            .tokens
            .payload(token)
            .ok_or_else(|| AppError::bad_request("Invalid token."))?;

        if payload.role != Role::Admin {
            return Err(AppError::bad_request("Only admins can list users."));
        }

        let users = match user_id {
            Some(id) => vec![
                self.users
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::not_found("User not found."))?,
            ],
            None => self.users.find_all().await?,
        };

        Ok(users.into_iter().map(UserView::from).collect())
    }
}
