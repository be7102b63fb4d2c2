use serde::{Deserialize, Serialize};

use crate::domain::{MovieId, UserId};
use crate::models::user::User;
use crate::services::LoggedUser;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Fields are optional so that missing ones are reported by validation
/// instead of the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub post_date: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub preview: Option<String>,
    pub video: Option<String>,
    pub actors: Option<Vec<String>>,
    pub director: Option<String>,
    pub duration: Option<i32>,
    pub poster: Option<String>,
    pub background_image: Option<String>,
    pub background_color: Option<String>,
}

/// Same shape as [`CreateMovieRequest`]; absent fields stay unchanged.
pub type EditMovieRequest = CreateMovieRequest;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub movie_id: Option<i32>,
    pub rating: Option<i32>,
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovieListQuery {
    pub limit: Option<u64>,
    pub genre: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentListQuery {
    pub limit: Option<u64>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

impl From<LoggedUser> for LoginResponse {
    fn from(logged: LoggedUser) -> Self {
        Self {
            user: UserResponse::from(&logged.user),
            token: logged.token,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatusResponse {
    pub movie_id: MovieId,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct PosterResponse {
    pub poster: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImageResponse {
    pub background_image: String,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_seconds: u64,
}
