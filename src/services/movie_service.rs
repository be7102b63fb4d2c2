//! Domain service for movie writes.
//!
//! Only the owner of a movie may change or delete it. A missing movie is
//! reported before the ownership check.

use crate::domain::{MovieId, MovieImage, UserId};
use crate::models::movie::{MovieChanges, NewMovie};
use crate::models::views::MovieDetail;
use crate::services::catalog_service::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("Movie not found: {0}")]
    NotFound(MovieId),

    #[error("Only the owner can modify movie {0}")]
    Forbidden(MovieId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for MovieError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for MovieError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<CatalogError> for MovieError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::NotFound(id),
            CatalogError::Database(msg) => Self::Database(msg),
            CatalogError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[async_trait::async_trait]
pub trait MovieService: Send + Sync {
    /// Stores a new movie owned by `owner`. The post date defaults to now.
    async fn create(&self, owner: UserId, movie: NewMovie) -> Result<MovieDetail, MovieError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// - Returns [`MovieError::NotFound`] if the movie does not exist
    /// - Returns [`MovieError::Forbidden`] if `caller` is not the owner
    async fn edit(
        &self,
        caller: UserId,
        movie_id: MovieId,
        changes: MovieChanges,
    ) -> Result<MovieDetail, MovieError>;

    /// Deletes the movie, its comments and every favorite pointing at it.
    ///
    /// # Errors
    ///
    /// Same as [`MovieService::edit`].
    async fn delete(&self, caller: UserId, movie_id: MovieId) -> Result<(), MovieError>;

    /// Points the poster or background image at an uploaded file and returns the filename.
    async fn set_image(
        &self,
        caller: UserId,
        movie_id: MovieId,
        kind: MovieImage,
        filename: String,
    ) -> Result<String, MovieError>;
}
