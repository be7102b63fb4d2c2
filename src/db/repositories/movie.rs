use crate::domain::{Genre, MovieId, MovieImage, UserId};
use crate::entities::{comments, movies, prelude::*, user_favorites};
use crate::models::movie::{Movie, MovieChanges, NewMovie};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: movies::Model) -> Result<Movie> {
        let genre = model
            .genre
            .parse::<Genre>()
            .with_context(|| format!("Movie {} has an invalid genre", model.id))?;
        let actors: Vec<String> = serde_json::from_str(&model.actors)
            .with_context(|| format!("Movie {} has a malformed actor list", model.id))?;

        Ok(Movie {
            id: MovieId::new(model.id),
            title: model.title,
            description: model.description,
            post_date: model.post_date,
            genre,
            year: model.year,
            preview: model.preview,
            video: model.video,
            actors,
            director: model.director,
            duration: model.duration,
            owner_id: UserId::new(model.user_id),
            poster: model.poster,
            background_image: model.background_image,
            background_color: model.background_color,
        })
    }

    fn map_models(models: Vec<movies::Model>) -> Result<Vec<Movie>> {
        models.into_iter().map(Self::map_model).collect()
    }

    pub async fn add(&self, owner: UserId, movie: &NewMovie) -> Result<Movie> {
        let active_model = movies::ActiveModel {
            title: Set(movie.title.clone()),
            description: Set(movie.description.clone()),
            post_date: Set(movie.post_date.unwrap_or_else(chrono::Utc::now)),
            genre: Set(movie.genre.as_str().to_string()),
            year: Set(movie.year),
            preview: Set(movie.preview.clone()),
            video: Set(movie.video.clone()),
            actors: Set(serde_json::to_string(&movie.actors)?),
            director: Set(movie.director.clone()),
            duration: Set(movie.duration),
            user_id: Set(owner.value()),
            poster: Set(movie.poster.clone()),
            background_image: Set(movie.background_image.clone()),
            background_color: Set(movie.background_color.clone()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert movie")?;

        Self::map_model(model)
    }

    pub async fn get(&self, id: MovieId) -> Result<Option<Movie>> {
        let model = Movies::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query movie by ID")?;

        model.map(Self::map_model).transpose()
    }

    pub async fn exists(&self, id: MovieId) -> Result<bool> {
        let count = Movies::find_by_id(id.value())
            .count(&self.conn)
            .await
            .context("Failed to check movie existence")?;

        Ok(count > 0)
    }

    /// Newest first; the genre filter is an exact match.
    pub async fn list(&self, limit: u64, genre: Option<Genre>) -> Result<Vec<Movie>> {
        let mut query = Movies::find();
        if let Some(genre) = genre {
            query = query.filter(movies::Column::Genre.eq(genre.as_str()));
        }

        let rows = query
            .order_by_desc(movies::Column::PostDate)
            .order_by_desc(movies::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list movies")?;

        Self::map_models(rows)
    }

    pub async fn get_by_ids(&self, ids: &[MovieId]) -> Result<Vec<Movie>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Movies::find()
            .filter(movies::Column::Id.is_in(ids.iter().map(MovieId::value)))
            .order_by_desc(movies::Column::PostDate)
            .order_by_desc(movies::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query movies by IDs")?;

        Self::map_models(rows)
    }

    /// Picks one movie uniformly at random.
    pub async fn random(&self) -> Result<Option<Movie>> {
        use rand::Rng;

        let total = Movies::find()
            .count(&self.conn)
            .await
            .context("Failed to count movies")?;
        if total == 0 {
            return Ok(None);
        }

        let offset = rand::rng().random_range(0..total);

        let model = Movies::find()
            .order_by_asc(movies::Column::Id)
            .offset(offset)
            .one(&self.conn)
            .await
            .context("Failed to sample movie")?;

        model.map(Self::map_model).transpose()
    }

    pub async fn update(&self, id: MovieId, changes: &MovieChanges) -> Result<Option<Movie>> {
        let Some(model) = Movies::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query movie for update")?
        else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Self::map_model(model).map(Some);
        }

        let mut active: movies::ActiveModel = model.into();
        if let Some(title) = &changes.title {
            active.title = Set(title.clone());
        }
        if let Some(description) = &changes.description {
            active.description = Set(description.clone());
        }
        if let Some(post_date) = changes.post_date {
            active.post_date = Set(post_date);
        }
        if let Some(genre) = changes.genre {
            active.genre = Set(genre.as_str().to_string());
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(preview) = &changes.preview {
            active.preview = Set(preview.clone());
        }
        if let Some(video) = &changes.video {
            active.video = Set(video.clone());
        }
        if let Some(actors) = &changes.actors {
            active.actors = Set(serde_json::to_string(actors)?);
        }
        if let Some(director) = &changes.director {
            active.director = Set(director.clone());
        }
        if let Some(duration) = changes.duration {
            active.duration = Set(duration);
        }
        if let Some(poster) = &changes.poster {
            active.poster = Set(poster.clone());
        }
        if let Some(background_image) = &changes.background_image {
            active.background_image = Set(background_image.clone());
        }
        if let Some(background_color) = &changes.background_color {
            active.background_color = Set(background_color.clone());
        }

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update movie")?;

        Self::map_model(model).map(Some)
    }

    pub async fn set_image(&self, id: MovieId, kind: MovieImage, filename: &str) -> Result<bool> {
        let column = match kind {
            MovieImage::Poster => movies::Column::Poster,
            MovieImage::Background => movies::Column::BackgroundImage,
        };

        let result = Movies::update_many()
            .col_expr(column, sea_orm::sea_query::Expr::value(filename))
            .filter(movies::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to update movie image")?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes the movie together with its comments and the favorite rows pointing at it.
    pub async fn remove(&self, id: MovieId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let comments_removed = comments::Entity::delete_many()
            .filter(comments::Column::MovieId.eq(id.value()))
            .exec(&txn)
            .await?
            .rows_affected;

        user_favorites::Entity::delete_many()
            .filter(user_favorites::Column::MovieId.eq(id.value()))
            .exec(&txn)
            .await?;

        let result = Movies::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            debug!(
                movie_id = %id,
                comments_removed,
                "Removed movie with its comments"
            );
        }
        Ok(removed)
    }
}
