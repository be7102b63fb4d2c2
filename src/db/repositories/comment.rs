use crate::domain::{CommentId, MovieId, UserId};
use crate::entities::{comments, prelude::*};
use crate::models::comment::{Comment, NewComment, RatingStats};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashMap;

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: comments::Model) -> Comment {
        Comment {
            id: CommentId::new(model.id),
            movie_id: MovieId::new(model.movie_id),
            user_id: UserId::new(model.user_id),
            rating: model.rating,
            text: model.text,
            post_date: model.post_date,
        }
    }

    pub async fn add(&self, author: UserId, comment: &NewComment) -> Result<Comment> {
        let active_model = comments::ActiveModel {
            movie_id: Set(comment.movie_id.value()),
            user_id: Set(author.value()),
            rating: Set(comment.rating),
            text: Set(comment.text.clone()),
            post_date: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert comment")?;

        Ok(Self::map_model(model))
    }

    /// Newest first, at most `limit` entries.
    pub async fn list_for_movie(&self, movie_id: MovieId, limit: u64) -> Result<Vec<Comment>> {
        let rows = Comments::find()
            .filter(comments::Column::MovieId.eq(movie_id.value()))
            .order_by_desc(comments::Column::PostDate)
            .order_by_desc(comments::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list comments for movie")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn rating_stats(&self, movie_id: MovieId) -> Result<RatingStats> {
        let row: Option<(i64, Option<i64>)> = Comments::find()
            .select_only()
            .column_as(comments::Column::Id.count(), "count")
            .column_as(comments::Column::Rating.sum(), "sum")
            .filter(comments::Column::MovieId.eq(movie_id.value()))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to aggregate comment ratings")?;

        Ok(row.map_or_else(RatingStats::default, |(count, sum)| RatingStats {
            count,
            sum: sum.unwrap_or(0),
        }))
    }

    pub async fn counts_for_movies(&self, movie_ids: &[MovieId]) -> Result<HashMap<MovieId, i64>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let results: Vec<(i32, i64)> = Comments::find()
            .select_only()
            .column(comments::Column::MovieId)
            .column_as(comments::Column::Id.count(), "count")
            .filter(comments::Column::MovieId.is_in(movie_ids.iter().map(MovieId::value)))
            .group_by(comments::Column::MovieId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count comments per movie")?;

        Ok(results
            .into_iter()
            .map(|(id, count)| (MovieId::new(id), count))
            .collect())
    }
}
