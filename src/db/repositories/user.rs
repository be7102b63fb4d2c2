use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use std::collections::HashMap;

use crate::domain::UserId;
use crate::entities::users;
use crate::models::user::{NewUser, StoredCredentials, User};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            name: model.name,
            email: model.email,
            avatar: model.avatar,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a user whose password was already hashed.
    ///
    /// A duplicate email surfaces as a unique constraint violation, see
    /// [`is_unique_violation`].
    pub async fn add(&self, user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = users::ActiveModel {
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            salt: Set(user.salt),
            avatar: Set(user.avatar),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Get user by email together with the stored hash and salt (for login)
    pub async fn get_credentials_by_email(&self, email: &str) -> Result<Option<StoredCredentials>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user credentials")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            let salt = u.salt.clone();
            StoredCredentials {
                user: User::from(u),
                password_hash,
                salt,
            }
        }))
    }

    pub async fn get_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().map(UserId::value)))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")?;

        Ok(rows
            .into_iter()
            .map(|model| (UserId::new(model.id), User::from(model)))
            .collect())
    }

    pub async fn exists(&self, id: UserId) -> Result<bool> {
        let count = users::Entity::find_by_id(id.value())
            .count(&self.conn)
            .await
            .context("Failed to check user existence")?;

        Ok(count > 0)
    }

    /// Returns `None` when the user does not exist.
    pub async fn update_avatar(&self, id: UserId, filename: &str) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for avatar update")?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.avatar = Set(Some(filename.to_string()));
        active.updated_at = Set(now);
        let model = active.update(&self.conn).await?;

        Ok(Some(User::from(model)))
    }
}

/// Whether a repository error was caused by a unique index rejecting the write.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .filter_map(DbErr::sql_err)
        .any(|sql_err| matches!(sql_err, SqlErr::UniqueConstraintViolation(_)))
}
