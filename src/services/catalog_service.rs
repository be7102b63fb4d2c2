//! Read-model composer for the movie catalog.
//!
//! Every projection is computed at query time by joining movie, comment and
//! user records. Ratings and comment counts are never stored.

use crate::domain::{Genre, MovieId, UserId};
use crate::models::views::{CommentView, MovieCard, MovieDetail, PromoMovie};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Movie not found: {0}")]
    NotFound(MovieId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for catalog reads.
///
/// ```rust,ignore
/// use marquee::services::{CatalogService, CatalogError};
/// use marquee::domain::MovieId;
/// use std::sync::Arc;
///
/// async fn example(service: Arc<dyn CatalogService>) -> Result<(), CatalogError> {
///     let detail = service.get_movie_detail(MovieId::new(1), None).await?;
///     assert!(!detail.is_favorite);
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Full movie card with the average rating, comment count and owner.
    ///
    /// `is_favorite` is only ever true when `caller` is given and has the
    /// movie in their favorites.
    ///
    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the movie does not exist
    async fn get_movie_detail(
        &self,
        movie_id: MovieId,
        caller: Option<UserId>,
    ) -> Result<MovieDetail, CatalogError>;

    /// Newest movies first, optionally restricted to one genre.
    async fn list_movies(
        &self,
        limit: Option<u64>,
        genre: Option<Genre>,
    ) -> Result<Vec<MovieCard>, CatalogError>;

    /// A uniformly random movie, `None` when the catalog is empty.
    async fn get_promo(&self) -> Result<Option<PromoMovie>, CatalogError>;

    /// The user's favorite movies, newest first. Unknown users get an empty list.
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<MovieCard>, CatalogError>;

    /// Newest comments first, capped at the configured page size.
    ///
    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the movie does not exist
    async fn list_comments_for_movie(
        &self,
        movie_id: MovieId,
        limit: Option<u64>,
    ) -> Result<Vec<CommentView>, CatalogError>;
}
