//! Random catalog rows for seeding and demos.
//!
//! Rows are assembled from a mock-data JSON document and written in the
//! format read by [`crate::services::import`].

use chrono::{Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::info;

const MIN_YEAR: i32 = 2010;
const MAX_YEAR: i32 = 2022;
const MIN_DURATION: i32 = 100;
const MAX_DURATION: i32 = 220;
const MAX_COMMENTS: u32 = 50;
const MAX_DAYS_AGO: i64 = 7;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Failed to fetch mock data: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Mock data has no {0}")]
    EmptyList(&'static str),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Source lists every generated field is drawn from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MockData {
    pub titles: Vec<String>,
    pub descriptions: Vec<String>,
    pub genres: Vec<String>,
    pub previews: Vec<String>,
    pub videos: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub names: Vec<String>,
    pub emails: Vec<String>,
    pub avatars: Vec<String>,
    pub passwords: Vec<String>,
    pub posters: Vec<String>,
    pub background_images: Vec<String>,
    pub background_colors: Vec<String>,
}

fn pick<'a, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [String],
    name: &'static str,
) -> Result<&'a str, GeneratorError> {
    items
        .choose(rng)
        .map(String::as_str)
        .ok_or(GeneratorError::EmptyList(name))
}

/// One TSV row (without the trailing newline).
pub fn generate_row<R: Rng + ?Sized>(data: &MockData, rng: &mut R) -> Result<String, GeneratorError> {
    let post_date = Utc::now() - Duration::days(rng.random_range(1..=MAX_DAYS_AGO));

    if data.actors.is_empty() {
        return Err(GeneratorError::EmptyList("actors"));
    }
    let actor_count = rng.random_range(1..=data.actors.len());
    let actors: Vec<&str> = data
        .actors
        .choose_multiple(rng, actor_count)
        .map(String::as_str)
        .collect();

    let rating = f64::from(rng.random_range(0..=100_u32)) / 10.0;

    let columns = [
        pick(rng, &data.titles, "titles")?.to_string(),
        pick(rng, &data.descriptions, "descriptions")?.to_string(),
        post_date.to_rfc3339(),
        pick(rng, &data.genres, "genres")?.to_string(),
        rng.random_range(MIN_YEAR..=MAX_YEAR).to_string(),
        format!("{rating:.1}"),
        pick(rng, &data.previews, "previews")?.to_string(),
        pick(rng, &data.videos, "videos")?.to_string(),
        actors.join(";"),
        pick(rng, &data.directors, "directors")?.to_string(),
        rng.random_range(MIN_DURATION..=MAX_DURATION).to_string(),
        rng.random_range(0..=MAX_COMMENTS).to_string(),
        pick(rng, &data.names, "names")?.to_string(),
        pick(rng, &data.emails, "emails")?.to_string(),
        pick(rng, &data.avatars, "avatars")?.to_string(),
        pick(rng, &data.passwords, "passwords")?.to_string(),
        pick(rng, &data.posters, "posters")?.to_string(),
        pick(rng, &data.background_images, "backgroundImages")?.to_string(),
        pick(rng, &data.background_colors, "backgroundColors")?.to_string(),
    ];

    Ok(columns.join("\t"))
}

pub async fn fetch_mock_data(url: &str) -> Result<MockData, GeneratorError> {
    let data = reqwest::get(url)
        .await?
        .error_for_status()?
        .json::<MockData>()
        .await?;
    Ok(data)
}

/// Writes `count` rows to `path`, replacing any existing file.
pub async fn write_rows(data: &MockData, count: usize, path: &Path) -> Result<(), GeneratorError> {
    // Built up front: the thread-local rng must not be held across awaits.
    let mut content = String::new();
    {
        let mut rng = rand::rng();
        for _ in 0..count {
            content.push_str(&generate_row(data, &mut rng)?);
            content.push('\n');
        }
    }

    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;

    info!(rows = count, file = %path.display(), "Mock catalog written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::import::parse_row;

    fn mock() -> MockData {
        let one = |s: &str| vec![s.to_string()];
        MockData {
            titles: one("Inception"),
            descriptions: one("A thief who steals corporate secrets through dreams."),
            genres: vec!["Scifi".to_string(), "Thriller".to_string()],
            previews: one("preview.mp4"),
            videos: one("video.mp4"),
            actors: vec!["A. Actor".to_string(), "B. Actor".to_string(), "C. Actor".to_string()],
            directors: one("Christopher Nolan"),
            names: one("Keks"),
            emails: one("keks@example.com"),
            avatars: one("avatar.jpg"),
            passwords: one("secret1"),
            posters: one("poster.jpg"),
            background_images: one("background.jpg"),
            background_colors: one("#D8D3BD"),
        }
    }

    #[test]
    fn test_generated_rows_parse_back() {
        let data = mock();
        let mut rng = rand::rng();

        for _ in 0..50 {
            let line = generate_row(&data, &mut rng).unwrap();
            let row = parse_row(&line).unwrap();

            assert!((MIN_YEAR..=MAX_YEAR).contains(&row.movie.year));
            assert!((MIN_DURATION..=MAX_DURATION).contains(&row.movie.duration));
            assert!(!row.movie.actors.is_empty() && row.movie.actors.len() <= 3);

            let age = Utc::now() - row.movie.post_date.unwrap();
            assert!(age >= Duration::days(1) && age <= Duration::days(MAX_DAYS_AGO) + Duration::minutes(1));
        }
    }

    #[test]
    fn test_empty_list_is_reported() {
        let data = MockData {
            titles: Vec::new(),
            ..mock()
        };
        assert!(matches!(
            generate_row(&data, &mut rand::rng()),
            Err(GeneratorError::EmptyList("titles"))
        ));
    }

    #[test]
    fn test_mock_data_uses_camel_case() {
        let json = r##"{"titles":["T"],"backgroundImages":["bg.jpg"],"backgroundColors":["#000000"]}"##;
        let data: MockData = serde_json::from_str(json).unwrap();
        assert_eq!(data.background_images, vec!["bg.jpg"]);
        assert!(data.actors.is_empty());
    }
}
