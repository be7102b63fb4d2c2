//! Domain service for accounts and authentication.
//!
//! Handles registration, login, the current-user lookup and avatar changes.

use crate::domain::UserId;
use crate::models::user::User;
use crate::services::credentials::CredentialError;
use serde::Serialize;
use thiserror::Error;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with email {0} already exists")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Users can only change their own avatar")]
    Forbidden,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Validated registration input. The password is still plaintext here.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// Login result containing the user and a fresh access token.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedUser {
    pub user: User,
    pub token: String,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the email is taken; no user is created.
    async fn register(&self, account: NewAccount) -> Result<User, AuthError>;

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a wrong password alike.
    async fn login(&self, email: &str, password: &str) -> Result<LoggedUser, AuthError>;

    /// Resolves the user behind an authenticated request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if the user no longer exists.
    async fn current_user(&self, user_id: UserId) -> Result<User, AuthError>;

    /// Sets `user_id`'s avatar to an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Forbidden`] when `caller` is someone else, before any lookup.
    async fn set_avatar(
        &self,
        caller: UserId,
        user_id: UserId,
        filename: String,
    ) -> Result<String, AuthError>;

    /// Tokens are stateless, so there is nothing to revoke yet.
    async fn logout(&self) -> Result<(), AuthError>;
}
