use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Genre, MovieId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub description: String,
    pub post_date: DateTime<Utc>,
    pub genre: Genre,
    pub year: i32,
    pub preview: String,
    pub video: String,
    pub actors: Vec<String>,
    pub director: String,
    pub duration: i32,
    pub owner_id: UserId,
    pub poster: String,
    pub background_image: String,
    pub background_color: String,
}

/// Validated input for a new movie. The owner comes from the caller, never from the payload.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    /// Defaults to the insertion time when absent
    pub post_date: Option<DateTime<Utc>>,
    pub genre: Genre,
    pub year: i32,
    pub preview: String,
    pub video: String,
    pub actors: Vec<String>,
    pub director: String,
    pub duration: i32,
    pub poster: String,
    pub background_image: String,
    pub background_color: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub post_date: Option<DateTime<Utc>>,
    pub genre: Option<Genre>,
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

impl MovieChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.post_date.is_none()
            && self.genre.is_none()
            && self.year.is_none()
            && self.preview.is_none()
            && self.video.is_none()
            && self.actors.is_none()
            && self.director.is_none()
            && self.duration.is_none()
            && self.poster.is_none()
            && self.background_image.is_none()
            && self.background_color.is_none()
    }
}
