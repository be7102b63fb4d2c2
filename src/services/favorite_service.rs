//! Domain service keeping a user's favorites set consistent.

use crate::domain::{FavoriteStatus, MovieId, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Movie not found: {0}")]
    MovieNotFound(MovieId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for FavoriteError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FavoriteError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait FavoriteService: Send + Sync {
    /// Moves the (user, movie) pair to `desired` and returns the resulting status.
    ///
    /// Repeating the same request is a no-op.
    ///
    /// # Errors
    ///
    /// - Returns [`FavoriteError::UserNotFound`] / [`FavoriteError::MovieNotFound`]
    ///   if either side does not exist
    async fn set_favorite_status(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        desired: FavoriteStatus,
    ) -> Result<FavoriteStatus, FavoriteError>;
}
