//! Bulk catalog import from tab separated files.
//!
//! Each non-blank line describes one movie and its owner:
//!
//! ```text
//! title  description  postDate  genre  year  rating  preview  video  actors
//! director  duration  comments  name  email  avatar  password  poster
//! backgroundImage  backgroundColor
//! ```
//!
//! `actors` is `;` separated. `rating` and `comments` are derived from stored
//! comments and therefore ignored.

use crate::db::Store;
use crate::domain::{Genre, UserId};
use crate::models::movie::NewMovie;
use crate::services::auth_service::{AuthError, AuthService, NewAccount};
use crate::services::movie_service::{MovieError, MovieService};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const COLUMN_COUNT: usize = 19;

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected {COLUMN_COUNT} columns, found {0}")]
    ColumnCount(usize),

    #[error("invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("missing {0}")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ImportError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ImportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Owner columns of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedOwner {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ImportedMovie {
    pub movie: NewMovie,
    pub owner: ImportedOwner,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

fn required(value: &str, field: &'static str) -> Result<String, RowError> {
    let value = value.trim();
    if value.is_empty() {
        Err(RowError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

fn number(value: &str, field: &'static str) -> Result<i32, RowError> {
    value.trim().parse().map_err(|_| RowError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Parses one TSV line. Trailing `\r`/`\n` are ignored.
pub fn parse_row(line: &str) -> Result<ImportedMovie, RowError> {
    let columns: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if columns.len() != COLUMN_COUNT {
        return Err(RowError::ColumnCount(columns.len()));
    }

    let [
        title,
        description,
        post_date,
        genre,
        year,
        _rating,
        preview,
        video,
        actors,
        director,
        duration,
        _comments,
        name,
        email,
        avatar,
        password,
        poster,
        background_image,
        background_color,
    ] = columns[..]
    else {
        return Err(RowError::ColumnCount(columns.len()));
    };

    let post_date = match post_date.trim() {
        "" => None,
        raw => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|_| RowError::InvalidField {
                    field: "postDate",
                    value: raw.to_string(),
                })?,
        ),
    };

    // Older exports list several genres; the first one wins.
    let genre_name = genre.split(';').next().unwrap_or_default().trim();
    let genre: Genre = genre_name.parse().map_err(|_| RowError::InvalidField {
        field: "genre",
        value: genre.to_string(),
    })?;

    let actors: Vec<String> = actors
        .split(';')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(ToString::to_string)
        .collect();
    if actors.is_empty() {
        return Err(RowError::Missing("actors"));
    }

    let movie = NewMovie {
        title: required(title, "title")?,
        description: required(description, "description")?,
        post_date,
        genre,
        year: number(year, "year")?,
        preview: required(preview, "preview")?,
        video: required(video, "video")?,
        actors,
        director: required(director, "director")?,
        duration: number(duration, "duration")?,
        poster: required(poster, "poster")?,
        background_image: required(background_image, "backgroundImage")?,
        background_color: required(background_color, "backgroundColor")?,
    };

    let avatar = avatar.trim();
    let owner = ImportedOwner {
        name: required(name, "name")?,
        email: required(email, "email")?,
        avatar: (!avatar.is_empty()).then(|| avatar.to_string()),
        password: required(password, "password")?,
    };

    Ok(ImportedMovie { movie, owner })
}

/// Loads TSV files into the catalog, creating missing owners on the way.
pub struct CatalogImporter {
    store: Arc<Store>,
    auth: Arc<dyn AuthService>,
    movies: Arc<dyn MovieService>,
}

impl CatalogImporter {
    #[must_use]
    pub fn new(
        store: Arc<Store>,
        auth: Arc<dyn AuthService>,
        movies: Arc<dyn MovieService>,
    ) -> Self {
        Self {
            store,
            auth,
            movies,
        }
    }

    async fn find_or_create_owner(&self, owner: &ImportedOwner) -> Result<UserId, ImportError> {
        if let Some(user) = self.store.get_user_by_email(&owner.email).await? {
            return Ok(user.id);
        }

        let account = NewAccount {
            name: owner.name.clone(),
            email: owner.email.clone(),
            password: owner.password.clone(),
            avatar: owner.avatar.clone(),
        };

        match self.auth.register(account).await {
            Ok(user) => Ok(user.id),
            // Registered concurrently between the lookup and the insert
            Err(AuthError::Conflict(_)) => self
                .store
                .get_user_by_email(&owner.email)
                .await?
                .map(|u| u.id)
                .ok_or_else(|| ImportError::Internal(format!("Owner {} vanished", owner.email))),
            Err(err) => Err(ImportError::Internal(err.to_string())),
        }
    }

    /// Imports one parsed row and returns the owner it was filed under.
    pub async fn import_movie(&self, row: ImportedMovie) -> Result<UserId, ImportError> {
        let owner = self.find_or_create_owner(&row.owner).await?;

        self.movies
            .create(owner, row.movie)
            .await
            .map_err(|err| match err {
                MovieError::Database(msg) => ImportError::Database(msg),
                other => ImportError::Internal(other.to_string()),
            })?;

        Ok(owner)
    }

    /// Imports every valid row of `content`. Bad rows are logged with their line number and skipped.
    pub async fn import_str(&self, content: &str) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary::default();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match parse_row(line) {
                Ok(row) => {
                    self.import_movie(row).await?;
                    summary.imported += 1;
                }
                Err(err) => {
                    warn!(line = index + 1, "Skipping invalid row: {err}");
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ImportError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let summary = self.import_str(&content).await?;
        info!(
            file = %path.display(),
            imported = summary.imported,
            skipped = summary.skipped,
            "Import finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "Inception\tA thief who steals corporate secrets through dreams.\t2022-10-15T12:00:00.000Z\tScifi\t2010\t8.8\tpreview.mp4\tvideo.mp4\tLeonardo DiCaprio;Elliot Page\tChristopher Nolan\t148\t12\tKeks\tkeks@example.com\tavatar.jpg\tsecret1\tposter.jpg\tbackground.jpg\t#112233";

    #[test]
    fn test_parse_row() {
        let row = parse_row(ROW).unwrap();

        assert_eq!(row.movie.title, "Inception");
        assert_eq!(row.movie.genre, Genre::Scifi);
        assert_eq!(row.movie.year, 2010);
        assert_eq!(row.movie.duration, 148);
        assert_eq!(row.movie.actors, vec!["Leonardo DiCaprio", "Elliot Page"]);
        assert_eq!(
            row.movie.post_date.unwrap().to_rfc3339(),
            "2022-10-15T12:00:00+00:00"
        );
        assert_eq!(row.owner.email, "keks@example.com");
        assert_eq!(row.owner.avatar.as_deref(), Some("avatar.jpg"));
        assert_eq!(row.movie.background_color, "#112233");
    }

    #[test]
    fn test_parse_row_ignores_trailing_newline_and_extra_genres() {
        let line = ROW.replace("\tScifi\t", "\tDrama;Crime\t") + "\r\n";
        let row = parse_row(&line).unwrap();
        assert_eq!(row.movie.genre, Genre::Drama);
    }

    #[test]
    fn test_parse_row_errors() {
        assert_eq!(
            parse_row("just\tthree\tcolumns").unwrap_err(),
            RowError::ColumnCount(3)
        );

        let bad_year = ROW.replace("\t2010\t", "\tlast year\t");
        assert!(matches!(
            parse_row(&bad_year),
            Err(RowError::InvalidField { field: "year", .. })
        ));

        let bad_genre = ROW.replace("\tScifi\t", "\tWestern\t");
        assert!(matches!(
            parse_row(&bad_genre),
            Err(RowError::InvalidField { field: "genre", .. })
        ));

        let no_password = ROW.replace("\tsecret1\t", "\t\t");
        assert_eq!(
            parse_row(&no_password).unwrap_err(),
            RowError::Missing("password")
        );
    }
}
