use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::{AuthUser, MaybeAuthUser};
use super::uploads::{discard_on_error, read_image, store_upload};
use super::validation::{
    validate_genre, validate_limit, validate_movie_changes, validate_movie_id, validate_new_movie,
};
use super::{
    ApiError, ApiResponse, AppState, BackgroundImageResponse, CommentListQuery,
    CreateMovieRequest, EditMovieRequest, MovieListQuery, PosterResponse,
};
use crate::domain::MovieImage;
use crate::models::views::{CommentView, MovieCard, MovieDetail, PromoMovie};
use crate::services::{CatalogError, MovieError, UploadKind};

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::movie_not_found(id),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
            CatalogError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<MovieError> for ApiError {
    fn from(err: MovieError) -> Self {
        match err {
            MovieError::NotFound(id) => Self::movie_not_found(id),
            MovieError::Forbidden(_) => Self::forbidden(err.to_string()),
            MovieError::Database(msg) => Self::DatabaseError(msg),
            MovieError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// GET /movies?limit&genre
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovieListQuery>,
) -> Result<Json<ApiResponse<Vec<MovieCard>>>, ApiError> {
    let max = state.config().catalog.max_movie_limit;
    let limit = query.limit.map(|l| validate_limit(l, max)).transpose()?;
    let genre = query.genre.as_deref().map(validate_genre).transpose()?;

    let movies = state.catalog_service().list_movies(limit, genre).await?;
    Ok(Json(ApiResponse::success(movies)))
}

/// GET /movies/promo
pub async fn get_promo(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PromoMovie>>, ApiError> {
    let promo = state
        .catalog_service()
        .get_promo()
        .await?
        .ok_or_else(|| ApiError::NotFound("No movies in the catalog".to_string()))?;

    Ok(Json(ApiResponse::success(promo)))
}

/// GET /movies/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MovieDetail>>, ApiError> {
    let movie_id = validate_movie_id(id)?;

    let detail = state
        .catalog_service()
        .get_movie_detail(movie_id, caller.map(|c| c.user_id))
        .await?;

    Ok(Json(ApiResponse::success(detail)))
}

/// POST /movies
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MovieDetail>>), ApiError> {
    let movie = validate_new_movie(payload)?;

    let detail = state.movie_service().create(caller.user_id, movie).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(detail))))
}

/// PATCH /movies/{id}
pub async fn edit_movie(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<EditMovieRequest>,
) -> Result<Json<ApiResponse<MovieDetail>>, ApiError> {
    let movie_id = validate_movie_id(id)?;
    let changes = validate_movie_changes(payload)?;

    let detail = state
        .movie_service()
        .edit(caller.user_id, movie_id, changes)
        .await?;

    Ok(Json(ApiResponse::success(detail)))
}

/// DELETE /movies/{id}
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let movie_id = validate_movie_id(id)?;

    state.movie_service().delete(caller.user_id, movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /movies/{id}/comments?limit
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<ApiResponse<Vec<CommentView>>>, ApiError> {
    let movie_id = validate_movie_id(id)?;
    let max = state.config().catalog.comment_page_size;
    let limit = query.limit.map(|l| validate_limit(l, max)).transpose()?;

    let comments = state
        .catalog_service()
        .list_comments_for_movie(movie_id, limit)
        .await?;

    Ok(Json(ApiResponse::success(comments)))
}

/// POST /movies/{id}/poster
pub async fn upload_poster(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PosterResponse>>, ApiError> {
    let movie_id = validate_movie_id(id)?;
    let file = read_image(multipart, UploadKind::Poster).await?;

    let filename = store_upload(&state, UploadKind::Poster, file).await?;
    let result = state
        .movie_service()
        .set_image(caller.user_id, movie_id, MovieImage::Poster, filename.clone())
        .await;
    let poster = discard_on_error(&state, &filename, result).await?;

    Ok(Json(ApiResponse::success(PosterResponse { poster })))
}

/// POST /movies/{id}/background
pub async fn upload_background(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BackgroundImageResponse>>, ApiError> {
    let movie_id = validate_movie_id(id)?;
    let file = read_image(multipart, UploadKind::Background).await?;

    let filename = store_upload(&state, UploadKind::Background, file).await?;
    let result = state
        .movie_service()
        .set_image(caller.user_id, movie_id, MovieImage::Background, filename.clone())
        .await;
    let background_image = discard_on_error(&state, &filename, result).await?;

    Ok(Json(ApiResponse::success(BackgroundImageResponse {
        background_image,
    })))
}
