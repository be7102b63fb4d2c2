//! `SeaORM` implementation of the `CatalogService` trait.

use crate::config::CatalogConfig;
use crate::db::Store;
use crate::domain::{Genre, MovieId, UserId};
use crate::models::movie::Movie;
use crate::models::user::User;
use crate::models::views::{CommentView, MovieCard, MovieDetail, PromoMovie, UserSummary};
use crate::services::catalog_service::{CatalogError, CatalogService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub struct SeaOrmCatalogService {
    store: Arc<Store>,
    config: CatalogConfig,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Arc<Store>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    async fn owner_summary(&self, owner_id: UserId) -> Result<UserSummary, CatalogError> {
        let owner = self
            .store
            .get_user(owner_id)
            .await?
            .ok_or_else(|| CatalogError::Internal(format!("Owner {owner_id} is missing")))?;

        Ok(UserSummary::from(&owner))
    }

    /// Attaches comment counts and owners to a page of movies.
    async fn cards(&self, movies: Vec<Movie>) -> Result<Vec<MovieCard>, CatalogError> {
        let movie_ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
        let mut owner_ids: Vec<UserId> = movies.iter().map(|m| m.owner_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let (counts, owners) = tokio::try_join!(
            self.store.comment_counts(&movie_ids),
            self.store.get_users_by_ids(&owner_ids),
        )?;

        movies
            .iter()
            .map(|movie| {
                let owner = lookup_user(&owners, movie.owner_id)?;
                let count = counts.get(&movie.id).copied().unwrap_or(0);
                Ok(MovieCard::project(movie, count, owner))
            })
            .collect()
    }
}

fn lookup_user(owners: &HashMap<UserId, User>, id: UserId) -> Result<UserSummary, CatalogError> {
    owners
        .get(&id)
        .map(UserSummary::from)
        .ok_or_else(|| CatalogError::Internal(format!("User {id} is missing")))
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn get_movie_detail(
        &self,
        movie_id: MovieId,
        caller: Option<UserId>,
    ) -> Result<MovieDetail, CatalogError> {
        let movie = self
            .store
            .get_movie(movie_id)
            .await?
            .ok_or(CatalogError::NotFound(movie_id))?;

        let favorite = async {
            match caller {
                Some(user_id) => self.store.is_favorite(user_id, movie_id).await,
                None => Ok(false),
            }
        };

        let (stats, owner, is_favorite) = tokio::try_join!(
            async { self.store.rating_stats(movie_id).await.map_err(CatalogError::from) },
            self.owner_summary(movie.owner_id),
            async { favorite.await.map_err(CatalogError::from) },
        )?;

        Ok(MovieDetail::project(
            movie,
            stats.average(),
            stats.count,
            owner,
            is_favorite,
        ))
    }

    async fn list_movies(
        &self,
        limit: Option<u64>,
        genre: Option<Genre>,
    ) -> Result<Vec<MovieCard>, CatalogError> {
        let limit = limit
            .unwrap_or(self.config.default_movie_limit)
            .min(self.config.max_movie_limit);

        let movies = self.store.list_movies(limit, genre).await?;
        self.cards(movies).await
    }

    async fn get_promo(&self) -> Result<Option<PromoMovie>, CatalogError> {
        let Some(movie) = self.store.random_movie().await? else {
            return Ok(None);
        };

        let owner = self.owner_summary(movie.owner_id).await?;
        Ok(Some(PromoMovie::project(movie, owner)))
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<MovieCard>, CatalogError> {
        let ids = self.store.favorite_movie_ids(user_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let movies = self.store.get_movies_by_ids(&ids).await?;
        self.cards(movies).await
    }

    async fn list_comments_for_movie(
        &self,
        movie_id: MovieId,
        limit: Option<u64>,
    ) -> Result<Vec<CommentView>, CatalogError> {
        if !self.store.movie_exists(movie_id).await? {
            return Err(CatalogError::NotFound(movie_id));
        }

        let limit = limit
            .unwrap_or(self.config.comment_page_size)
            .min(self.config.comment_page_size);

        let comments = self.store.list_comments(movie_id, limit).await?;

        let mut author_ids: Vec<UserId> = comments.iter().map(|c| c.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = self.store.get_users_by_ids(&author_ids).await?;

        comments
            .into_iter()
            .map(|comment| {
                let user = lookup_user(&authors, comment.user_id)?;
                Ok(CommentView {
                    id: comment.id,
                    text: comment.text,
                    rating: comment.rating,
                    post_date: comment.post_date,
                    user,
                })
            })
            .collect()
    }
}
