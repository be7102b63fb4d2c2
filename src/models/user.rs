use serde::Serialize;

use crate::domain::UserId;

/// User data returned from the store (without password hash or salt)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub avatar: Option<String>,
}

/// Stored secret material for password verification.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
    pub salt: String,
}
