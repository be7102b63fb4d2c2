use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::AuthUser;
use super::uploads::{discard_on_error, read_image, store_upload};
use super::validation::{
    validate_favorite_status, validate_id, validate_login, validate_movie_id,
    validate_registration,
};
use super::{
    ApiError, ApiResponse, AppState, AvatarResponse, FavoriteStatusResponse, LoginRequest,
    LoginResponse, RegisterRequest, UserResponse,
};
use crate::domain::UserId;
use crate::models::views::MovieCard;
use crate::services::{AuthError, FavoriteError, UploadKind};

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Conflict(_) => Self::Conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::Unauthorized => Self::unauthorized(),
            AuthError::Forbidden => Self::forbidden(err.to_string()),
            AuthError::UserNotFound(id) => Self::not_found("User", id),
            AuthError::Unimplemented(_) => Self::NotImplemented(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<FavoriteError> for ApiError {
    fn from(err: FavoriteError) -> Self {
        match err {
            FavoriteError::MovieNotFound(id) => Self::movie_not_found(id),
            FavoriteError::UserNotFound(id) => Self::not_found("User", id),
            FavoriteError::Database(msg) => Self::DatabaseError(msg),
            FavoriteError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// POST /users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let account = validate_registration(payload)?;

    let user = state.auth_service().register(account).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserResponse::from(&user))),
    ))
}

/// POST /users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let (email, password) = validate_login(payload)?;

    let logged = state.auth_service().login(&email, &password).await?;
    Ok(Json(ApiResponse::success(LoginResponse::from(logged))))
}

/// GET /users/login
pub async fn check_authenticated(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.auth_service().current_user(caller.user_id).await?;
    Ok(Json(ApiResponse::success(UserResponse::from(&user))))
}

/// DELETE /users/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.auth_service().logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<MovieCard>>>, ApiError> {
    let movies = state.catalog_service().list_favorites(caller.user_id).await?;
    Ok(Json(ApiResponse::success(movies)))
}

/// POST /users/favorites/{movieId}/{status}
pub async fn set_favorite_status(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path((movie_id, status)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<FavoriteStatusResponse>>, ApiError> {
    let movie_id = validate_movie_id(movie_id)?;
    let desired = validate_favorite_status(status)?;

    let status = state
        .favorite_service()
        .set_favorite_status(caller.user_id, movie_id, desired)
        .await?;

    Ok(Json(ApiResponse::success(FavoriteStatusResponse {
        movie_id,
        is_favorite: status.is_favored(),
    })))
}

/// POST /users/{userId}/avatar
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(user_id): Path<i32>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AvatarResponse>>), ApiError> {
    let user_id = UserId::new(validate_id(user_id, "user ID")?);
    if caller.user_id != user_id {
        return Err(AuthError::Forbidden.into());
    }

    let file = read_image(multipart, UploadKind::Avatar).await?;
    let filename = store_upload(&state, UploadKind::Avatar, file).await?;
    let result = state
        .auth_service()
        .set_avatar(caller.user_id, user_id, filename.clone())
        .await;
    let avatar = discard_on_error(&state, &filename, result).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AvatarResponse { avatar })),
    ))
}
