use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::validate_new_comment;
use super::{ApiError, ApiResponse, AppState, CreateCommentRequest};
use crate::models::views::CommentView;
use crate::services::CommentError;

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::MovieNotFound(id) => Self::movie_not_found(id),
            // The token outlived its user
            CommentError::AuthorNotFound(_) => Self::unauthorized(),
            CommentError::Database(msg) => Self::DatabaseError(msg),
            CommentError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// POST /comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentView>>), ApiError> {
    let comment = validate_new_comment(payload)?;

    let created = state
        .comment_service()
        .create(caller.user_id, comment)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
