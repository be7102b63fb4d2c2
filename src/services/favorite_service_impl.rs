//! `SeaORM` implementation of the `FavoriteService` trait.

use crate::db::Store;
use crate::domain::{FavoriteStatus, MovieId, UserId};
use crate::services::favorite_service::{FavoriteError, FavoriteService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmFavoriteService {
    store: Arc<Store>,
}

impl SeaOrmFavoriteService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FavoriteService for SeaOrmFavoriteService {
    async fn set_favorite_status(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        desired: FavoriteStatus,
    ) -> Result<FavoriteStatus, FavoriteError> {
        let (user_exists, movie_exists) = tokio::try_join!(
            self.store.user_exists(user_id),
            self.store.movie_exists(movie_id),
        )?;

        if !user_exists {
            return Err(FavoriteError::UserNotFound(user_id));
        }
        if !movie_exists {
            return Err(FavoriteError::MovieNotFound(movie_id));
        }

        let changed = match desired {
            FavoriteStatus::Favored => self.store.add_favorite(user_id, movie_id).await?,
            FavoriteStatus::NotFavored => self.store.remove_favorite(user_id, movie_id).await? > 0,
        };

        if changed {
            metrics::counter!("favorites_changed_total").increment(1);
            info!(
                user_id = %user_id,
                movie_id = %movie_id,
                favored = desired.is_favored(),
                "Favorite status changed"
            );
        }

        Ok(desired)
    }
}
