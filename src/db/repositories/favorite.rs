use crate::domain::{MovieId, UserId};
use crate::entities::{prelude::*, user_favorites};
use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};

/// Access to the user -> movie favorites set.
pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when the pair was already present.
    pub async fn add(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        let row = user_favorites::ActiveModel {
            user_id: Set(user_id.value()),
            movie_id: Set(movie_id.value()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let inserted = UserFavorites::insert(row)
            .on_conflict(
                OnConflict::columns([
                    user_favorites::Column::UserId,
                    user_favorites::Column::MovieId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to add favorite")?;

        Ok(inserted > 0)
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn remove(&self, user_id: UserId, movie_id: MovieId) -> Result<u64> {
        let result = UserFavorites::delete_many()
            .filter(user_favorites::Column::UserId.eq(user_id.value()))
            .filter(user_favorites::Column::MovieId.eq(movie_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to remove favorite")?;

        Ok(result.rows_affected)
    }

    pub async fn contains(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        let count = UserFavorites::find()
            .filter(user_favorites::Column::UserId.eq(user_id.value()))
            .filter(user_favorites::Column::MovieId.eq(movie_id.value()))
            .count(&self.conn)
            .await
            .context("Failed to query favorite")?;

        Ok(count > 0)
    }

    pub async fn movie_ids_for_user(&self, user_id: UserId) -> Result<Vec<MovieId>> {
        let ids: Vec<i32> = UserFavorites::find()
            .select_only()
            .column(user_favorites::Column::MovieId)
            .filter(user_favorites::Column::UserId.eq(user_id.value()))
            .order_by_asc(user_favorites::Column::CreatedAt)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list favorites for user")?;

        Ok(ids.into_iter().map(MovieId::new).collect())
    }
}
