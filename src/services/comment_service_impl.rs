//! `SeaORM` implementation of the `CommentService` trait.

use crate::db::Store;
use crate::domain::UserId;
use crate::models::comment::NewComment;
use crate::models::views::{CommentView, UserSummary};
use crate::services::comment_service::{CommentError, CommentService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmCommentService {
    store: Arc<Store>,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommentService for SeaOrmCommentService {
    async fn create(&self, author: UserId, comment: NewComment) -> Result<CommentView, CommentError> {
        if !self.store.movie_exists(comment.movie_id).await? {
            return Err(CommentError::MovieNotFound(comment.movie_id));
        }

        let user = self
            .store
            .get_user(author)
            .await?
            .ok_or(CommentError::AuthorNotFound(author))?;

        let stored = self.store.add_comment(author, &comment).await?;
        metrics::counter!("comments_created_total").increment(1);
        info!(
            movie_id = %stored.movie_id,
            comment_id = %stored.id,
            rating = stored.rating,
            "Comment added"
        );

        Ok(CommentView {
            id: stored.id,
            text: stored.text,
            rating: stored.rating,
            post_date: stored.post_date,
            user: UserSummary::from(&user),
        })
    }
}
