use crate::domain::{Genre, MovieId, MovieImage, UserId};
use crate::models::comment::{Comment, NewComment, RatingStats};
use crate::models::movie::{Movie, MovieChanges, NewMovie};
use crate::models::user::{NewUser, StoredCredentials, User};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::user::is_unique_violation;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Each pooled connection to an in-memory SQLite database is its own database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);
        if !in_memory {
            opt.max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Movies
    // ========================================================================

    pub async fn add_movie(&self, owner: UserId, movie: &NewMovie) -> Result<Movie> {
        self.movie_repo().add(owner, movie).await
    }

    pub async fn get_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        self.movie_repo().get(id).await
    }

    pub async fn movie_exists(&self, id: MovieId) -> Result<bool> {
        self.movie_repo().exists(id).await
    }

    pub async fn list_movies(&self, limit: u64, genre: Option<Genre>) -> Result<Vec<Movie>> {
        self.movie_repo().list(limit, genre).await
    }

    pub async fn get_movies_by_ids(&self, ids: &[MovieId]) -> Result<Vec<Movie>> {
        self.movie_repo().get_by_ids(ids).await
    }

    pub async fn random_movie(&self) -> Result<Option<Movie>> {
        self.movie_repo().random().await
    }

    pub async fn update_movie(&self, id: MovieId, changes: &MovieChanges) -> Result<Option<Movie>> {
        self.movie_repo().update(id, changes).await
    }

    pub async fn set_movie_image(
        &self,
        id: MovieId,
        kind: MovieImage,
        filename: &str,
    ) -> Result<bool> {
        self.movie_repo().set_image(id, kind, filename).await
    }

    pub async fn remove_movie(&self, id: MovieId) -> Result<bool> {
        self.movie_repo().remove(id).await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    pub async fn add_comment(&self, author: UserId, comment: &NewComment) -> Result<Comment> {
        self.comment_repo().add(author, comment).await
    }

    pub async fn list_comments(&self, movie_id: MovieId, limit: u64) -> Result<Vec<Comment>> {
        self.comment_repo().list_for_movie(movie_id, limit).await
    }

    pub async fn rating_stats(&self, movie_id: MovieId) -> Result<RatingStats> {
        self.comment_repo().rating_stats(movie_id).await
    }

    pub async fn comment_counts(&self, movie_ids: &[MovieId]) -> Result<HashMap<MovieId, i64>> {
        self.comment_repo().counts_for_movies(movie_ids).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn add_user(&self, user: NewUser) -> Result<User> {
        self.user_repo().add(user).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_credentials_by_email(&self, email: &str) -> Result<Option<StoredCredentials>> {
        self.user_repo().get_credentials_by_email(email).await
    }

    pub async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn user_exists(&self, id: UserId) -> Result<bool> {
        self.user_repo().exists(id).await
    }

    pub async fn update_user_avatar(&self, id: UserId, filename: &str) -> Result<Option<User>> {
        self.user_repo().update_avatar(id, filename).await
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn add_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        self.favorite_repo().add(user_id, movie_id).await
    }

    pub async fn remove_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<u64> {
        self.favorite_repo().remove(user_id, movie_id).await
    }

    pub async fn is_favorite(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        self.favorite_repo().contains(user_id, movie_id).await
    }

    pub async fn favorite_movie_ids(&self, user_id: UserId) -> Result<Vec<MovieId>> {
        self.favorite_repo().movie_ids_for_user(user_id).await
    }
}
