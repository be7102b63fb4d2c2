//! Request validation.
//!
//! Each function checks one request shape and returns the domain input the
//! services work with. Lengths are counted in characters, not bytes.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use super::ApiError;
use super::types::{CreateCommentRequest, CreateMovieRequest, LoginRequest, RegisterRequest};
use crate::domain::{FavoriteStatus, Genre, MovieId};
use crate::models::comment::NewComment;
use crate::models::movie::{MovieChanges, NewMovie};
use crate::services::NewAccount;

pub const TITLE_LENGTH: (usize, usize) = (2, 100);
pub const DESCRIPTION_LENGTH: (usize, usize) = (20, 1024);
pub const DIRECTOR_LENGTH: (usize, usize) = (2, 50);
pub const YEAR_RANGE: (i32, i32) = (1895, 2100);
pub const COMMENT_TEXT_LENGTH: (usize, usize) = (5, 1024);
pub const RATING_RANGE: (i32, i32) = (1, 10);
pub const NAME_LENGTH: (usize, usize) = (1, 15);
pub const PASSWORD_LENGTH: (usize, usize) = (6, 12);

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

fn validate_length(value: &str, field: &str, (min, max): (usize, usize)) -> Result<String, ApiError> {
    let value = value.trim();
    let len = value.chars().count();
    if !(min..=max).contains(&len) {
        return Err(ApiError::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(value.to_string())
}

fn validate_not_blank(value: &str, field: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

pub fn validate_id(id: i32, field: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {field}: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_movie_id(id: i32) -> Result<MovieId, ApiError> {
    validate_id(id, "movie ID").map(MovieId::new)
}

pub fn validate_limit(limit: u64, max: u64) -> Result<u64, ApiError> {
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=max).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {max}"
        )));
    }
    Ok(limit)
}

pub fn validate_genre(genre: &str) -> Result<Genre, ApiError> {
    genre.parse().map_err(|e| ApiError::validation(format!("{e}")))
}

pub fn validate_favorite_status(flag: i32) -> Result<FavoriteStatus, ApiError> {
    FavoriteStatus::from_flag(flag)
        .ok_or_else(|| ApiError::validation(format!("Invalid favorite status: {flag}. Expected 0 or 1")))
}

pub fn validate_title(title: &str) -> Result<String, ApiError> {
    validate_length(title, "title", TITLE_LENGTH)
}

pub fn validate_description(description: &str) -> Result<String, ApiError> {
    validate_length(description, "description", DESCRIPTION_LENGTH)
}

pub fn validate_director(director: &str) -> Result<String, ApiError> {
    validate_length(director, "director", DIRECTOR_LENGTH)
}

pub fn validate_year(year: i32) -> Result<i32, ApiError> {
    let (min, max) = YEAR_RANGE;
    if !(min..=max).contains(&year) {
        return Err(ApiError::validation(format!("year must be between {min} and {max}")));
    }
    Ok(year)
}

pub fn validate_duration(duration: i32) -> Result<i32, ApiError> {
    if duration <= 0 {
        return Err(ApiError::validation("duration must be a positive number of minutes"));
    }
    Ok(duration)
}

pub fn validate_actors(actors: &[String]) -> Result<Vec<String>, ApiError> {
    let actors: Vec<String> = actors
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(ToString::to_string)
        .collect();

    if actors.is_empty() {
        return Err(ApiError::validation("actors must list at least one actor"));
    }
    Ok(actors)
}

pub fn validate_background_color(color: &str) -> Result<String, ApiError> {
    let color = color.trim();
    if !COLOR_RE.is_match(color) {
        return Err(ApiError::validation(
            "backgroundColor must be a hex color like #D8D3BD",
        ));
    }
    Ok(color.to_string())
}

pub fn validate_post_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| ApiError::validation("postDate must be an RFC 3339 timestamp"))
}

pub fn validate_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(ApiError::validation("email must be a valid address"));
    }
    Ok(email.to_string())
}

pub fn validate_password(password: &str) -> Result<String, ApiError> {
    let (min, max) = PASSWORD_LENGTH;
    let len = password.chars().count();
    if !(min..=max).contains(&len) {
        return Err(ApiError::validation(format!(
            "password must be between {min} and {max} characters"
        )));
    }
    Ok(password.to_string())
}

pub fn validate_new_movie(request: CreateMovieRequest) -> Result<NewMovie, ApiError> {
    Ok(NewMovie {
        title: validate_title(&required(request.title, "title")?)?,
        description: validate_description(&required(request.description, "description")?)?,
        post_date: request.post_date.as_deref().map(validate_post_date).transpose()?,
        genre: validate_genre(&required(request.genre, "genre")?)?,
        year: validate_year(required(request.year, "year")?)?,
        preview: validate_not_blank(&required(request.preview, "preview")?, "preview")?,
        video: validate_not_blank(&required(request.video, "video")?, "video")?,
        actors: validate_actors(&required(request.actors, "actors")?)?,
        director: validate_director(&required(request.director, "director")?)?,
        duration: validate_duration(required(request.duration, "duration")?)?,
        poster: validate_not_blank(&required(request.poster, "poster")?, "poster")?,
        background_image: validate_not_blank(
            &required(request.background_image, "backgroundImage")?,
            "backgroundImage",
        )?,
        background_color: validate_background_color(&required(
            request.background_color,
            "backgroundColor",
        )?)?,
    })
}

pub fn validate_movie_changes(request: CreateMovieRequest) -> Result<MovieChanges, ApiError> {
    let changes = MovieChanges {
        title: request.title.as_deref().map(validate_title).transpose()?,
        description: request.description.as_deref().map(validate_description).transpose()?,
        post_date: request.post_date.as_deref().map(validate_post_date).transpose()?,
        genre: request.genre.as_deref().map(validate_genre).transpose()?,
        year: request.year.map(validate_year).transpose()?,
        preview: request
            .preview
            .as_deref()
            .map(|v| validate_not_blank(v, "preview"))
            .transpose()?,
        video: request
            .video
            .as_deref()
            .map(|v| validate_not_blank(v, "video"))
            .transpose()?,
        actors: request.actors.as_deref().map(validate_actors).transpose()?,
        director: request.director.as_deref().map(validate_director).transpose()?,
        duration: request.duration.map(validate_duration).transpose()?,
        poster: request
            .poster
            .as_deref()
            .map(|v| validate_not_blank(v, "poster"))
            .transpose()?,
        background_image: request
            .background_image
            .as_deref()
            .map(|v| validate_not_blank(v, "backgroundImage"))
            .transpose()?,
        background_color: request
            .background_color
            .as_deref()
            .map(validate_background_color)
            .transpose()?,
    };

    if changes.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }
    Ok(changes)
}

pub fn validate_new_comment(request: CreateCommentRequest) -> Result<NewComment, ApiError> {
    let movie_id = validate_movie_id(required(request.movie_id, "movieId")?)?;

    let rating = required(request.rating, "rating")?;
    let (min, max) = RATING_RANGE;
    if !(min..=max).contains(&rating) {
        return Err(ApiError::validation(format!("rating must be between {min} and {max}")));
    }

    let text = validate_length(&required(request.text, "text")?, "text", COMMENT_TEXT_LENGTH)?;

    Ok(NewComment {
        movie_id,
        rating,
        text,
    })
}

pub fn validate_registration(request: RegisterRequest) -> Result<NewAccount, ApiError> {
    Ok(NewAccount {
        name: validate_length(&required(request.name, "name")?, "name", NAME_LENGTH)?,
        email: validate_email(&required(request.email, "email")?)?,
        password: validate_password(&required(request.password, "password")?)?,
        avatar: request
            .avatar
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
    })
}

/// Only shape is checked here; a wrong password is reported as unauthorized.
pub fn validate_login(request: LoginRequest) -> Result<(String, String), ApiError> {
    let email = validate_email(&required(request.email, "email")?)?;
    let password = required(request.password, "password")?;
    if password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }
    Ok((email, password))
}
