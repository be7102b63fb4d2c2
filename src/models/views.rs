//! Read-model projections handed to the HTTP layer.
//!
//! These are computed per request by the catalog service; none of them is
//! persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{CommentId, Genre, MovieId, UserId};
use crate::models::movie::Movie;
use crate::models::user::User;

/// Public part of a user record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// List-view entry: comment count but no rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieCard {
    pub id: MovieId,
    pub title: String,
    pub post_date: DateTime<Utc>,
    pub genre: Genre,
    pub preview: String,
    pub comment_count: i64,
    pub user: UserSummary,
    pub poster: String,
}

impl MovieCard {
    #[must_use]
    pub fn project(movie: &Movie, comment_count: i64, user: UserSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            post_date: movie.post_date,
            genre: movie.genre,
            preview: movie.preview.clone(),
            comment_count,
            user,
            poster: movie.poster.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    pub id: MovieId,
    pub title: String,
    pub description: String,
    pub post_date: DateTime<Utc>,
    pub genre: Genre,
    pub year: i32,
    /// `None` (serialized as `null`) when the movie has no comments
    pub rating: Option<f64>,
    pub preview: String,
    pub video: String,
    pub actors: Vec<String>,
    pub director: String,
    pub duration: i32,
    pub comment_count: i64,
    pub user: UserSummary,
    pub poster: String,
    pub background_image: String,
    pub background_color: String,
    pub is_favorite: bool,
}

impl MovieDetail {
    #[must_use]
    pub fn project(
        movie: Movie,
        rating: Option<f64>,
        comment_count: i64,
        user: UserSummary,
        is_favorite: bool,
    ) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            description: movie.description,
            post_date: movie.post_date,
            genre: movie.genre,
            year: movie.year,
            rating,
            preview: movie.preview,
            video: movie.video,
            actors: movie.actors,
            director: movie.director,
            duration: movie.duration,
            comment_count,
            user,
            poster: movie.poster,
            background_image: movie.background_image,
            background_color: movie.background_color,
            is_favorite,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoMovie {
    pub id: MovieId,
    pub title: String,
    pub genre: Genre,
    pub year: i32,
    pub preview: String,
    pub video: String,
    pub poster: String,
    pub background_image: String,
    pub background_color: String,
    pub user: UserSummary,
}

impl PromoMovie {
    #[must_use]
    pub fn project(movie: Movie, user: UserSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            genre: movie.genre,
            year: movie.year,
            preview: movie.preview,
            video: movie.video,
            poster: movie.poster,
            background_image: movie.background_image,
            background_color: movie.background_color,
            user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub text: String,
    pub rating: i32,
    pub post_date: DateTime<Utc>,
    pub user: UserSummary,
}
