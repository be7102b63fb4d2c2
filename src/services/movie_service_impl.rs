//! `SeaORM` implementation of the `MovieService` trait.

use crate::db::Store;
use crate::domain::{MovieId, MovieImage, UserId};
use crate::models::movie::{Movie, MovieChanges, NewMovie};
use crate::models::views::MovieDetail;
use crate::services::catalog_service::CatalogService;
use crate::services::movie_service::{MovieError, MovieService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmMovieService {
    store: Arc<Store>,
    catalog: Arc<dyn CatalogService>,
}

impl SeaOrmMovieService {
    #[must_use]
    pub fn new(store: Arc<Store>, catalog: Arc<dyn CatalogService>) -> Self {
        Self { store, catalog }
    }

    /// Loads the movie and checks that `caller` owns it.
    async fn owned_movie(&self, caller: UserId, movie_id: MovieId) -> Result<Movie, MovieError> {
        let movie = self
            .store
            .get_movie(movie_id)
            .await?
            .ok_or(MovieError::NotFound(movie_id))?;

        if movie.owner_id != caller {
            return Err(MovieError::Forbidden(movie_id));
        }

        Ok(movie)
    }
}

#[async_trait]
impl MovieService for SeaOrmMovieService {
    async fn create(&self, owner: UserId, movie: NewMovie) -> Result<MovieDetail, MovieError> {
        let created = self.store.add_movie(owner, &movie).await?;
        metrics::counter!("movies_created_total").increment(1);
        info!(movie_id = %created.id, owner = %owner, "Movie created: {}", created.title);

        Ok(self.catalog.get_movie_detail(created.id, Some(owner)).await?)
    }

    async fn edit(
        &self,
        caller: UserId,
        movie_id: MovieId,
        changes: MovieChanges,
    ) -> Result<MovieDetail, MovieError> {
        self.owned_movie(caller, movie_id).await?;

        self.store
            .update_movie(movie_id, &changes)
            .await?
            .ok_or(MovieError::NotFound(movie_id))?;

        info!(movie_id = %movie_id, "Movie updated");
        Ok(self.catalog.get_movie_detail(movie_id, Some(caller)).await?)
    }

    async fn delete(&self, caller: UserId, movie_id: MovieId) -> Result<(), MovieError> {
        let movie = self.owned_movie(caller, movie_id).await?;

        if !self.store.remove_movie(movie_id).await? {
            return Err(MovieError::NotFound(movie_id));
        }

        info!(movie_id = %movie_id, "Movie deleted by owner: {}", movie.title);
        Ok(())
    }

    async fn set_image(
        &self,
        caller: UserId,
        movie_id: MovieId,
        kind: MovieImage,
        filename: String,
    ) -> Result<String, MovieError> {
        self.owned_movie(caller, movie_id).await?;

        if !self.store.set_movie_image(movie_id, kind, &filename).await? {
            return Err(MovieError::NotFound(movie_id));
        }

        info!(movie_id = %movie_id, ?kind, file = %filename, "Movie image updated");
        Ok(filename)
    }
}
