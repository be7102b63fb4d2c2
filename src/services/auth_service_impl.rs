//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::{Store, is_unique_violation};
use crate::domain::UserId;
use crate::models::user::{NewUser, User};
use crate::services::auth_service::{AuthError, AuthService, LoggedUser, NewAccount};
use crate::services::credentials::{Credentials, TokenSubject};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task;
use tracing::{info, warn};

pub struct SeaOrmAuthService {
    store: Arc<Store>,
    credentials: Arc<Credentials>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Arc<Store>, credentials: Arc<Credentials>) -> Self {
        Self { store, credentials }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, account: NewAccount) -> Result<User, AuthError> {
        if self.store.get_user_by_email(&account.email).await?.is_some() {
            return Err(AuthError::Conflict(account.email));
        }

        let salt = Credentials::generate_salt();
        let credentials = Arc::clone(&self.credentials);
        let password = account.password;
        let hash_salt = salt.clone();

        // Argon2 is CPU heavy; keep it off the async workers
        let password_hash =
            task::spawn_blocking(move || credentials.hash_password(&password, &hash_salt))
                .await
                .context("Password hashing task panicked")??;

        let new_user = NewUser {
            name: account.name,
            email: account.email.clone(),
            password_hash,
            salt,
            avatar: account.avatar,
        };

        match self.store.add_user(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "New user registered: {}", user.email);
                Ok(user)
            }
            Err(err) if is_unique_violation(&err) => Err(AuthError::Conflict(account.email)),
            Err(err) => Err(err.into()),
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoggedUser, AuthError> {
        let stored = self.store.get_credentials_by_email(email).await?;
        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();

        let Some(stored) = stored else {
            // Unknown and wrong-password logins must take the same time
            task::spawn_blocking(move || credentials.verify_unknown_account(&password))
                .await
                .context("Password verification task panicked")?;
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let salt = stored.salt.clone();
        let hash = stored.password_hash.clone();

        let is_valid =
            task::spawn_blocking(move || credentials.verify_password(&password, &salt, &hash))
                .await
                .context("Password verification task panicked")?;

        if !is_valid {
            warn!(user_id = %stored.user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.credentials.issue_token(&TokenSubject {
            user_id: stored.user.id,
            email: stored.user.email.clone(),
        })?;

        info!(user_id = %stored.user.id, "User logged in");
        Ok(LoggedUser {
            user: stored.user,
            token,
        })
    }

    async fn current_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }

    async fn set_avatar(
        &self,
        caller: UserId,
        user_id: UserId,
        filename: String,
    ) -> Result<String, AuthError> {
        if caller != user_id {
            return Err(AuthError::Forbidden);
        }

        self.store
            .update_user_avatar(user_id, &filename)
            .await?
            .ok_or(AuthError::UserNotFound(user_id))?;

        info!(user_id = %user_id, file = %filename, "Avatar updated");
        Ok(filename)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        Err(AuthError::Unimplemented("Logout"))
    }
}
