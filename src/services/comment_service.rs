use crate::domain::{MovieId, UserId};
use crate::models::comment::NewComment;
use crate::models::views::CommentView;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Movie not found: {0}")]
    MovieNotFound(MovieId),

    #[error("Author not found: {0}")]
    AuthorNotFound(UserId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CommentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CommentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    /// Adds a comment to an existing movie.
    ///
    /// # Errors
    ///
    /// - Returns [`CommentError::MovieNotFound`] if the movie does not exist
    async fn create(&self, author: UserId, comment: NewComment) -> Result<CommentView, CommentError>;
}
