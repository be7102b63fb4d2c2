use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, CommentService, Credentials, FavoriteService, MovieService,
    UploadService,
};
use crate::state::SharedState;

pub mod auth;
mod comments;
mod error;
mod movies;
mod observability;
mod types;
mod uploads;
mod users;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

/// Multipart framing overhead allowed on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.shared.credentials
    }

    #[must_use]
    pub fn catalog_service(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog_service
    }

    #[must_use]
    pub fn favorite_service(&self) -> &Arc<dyn FavoriteService> {
        &self.shared.favorite_service
    }

    #[must_use]
    pub fn movie_service(&self) -> &Arc<dyn MovieService> {
        &self.shared.movie_service
    }

    #[must_use]
    pub fn comment_service(&self) -> &Arc<dyn CommentService> {
        &self.shared.comment_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn upload_service(&self) -> &UploadService {
        &self.shared.upload_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let upload_dir = state.upload_service().directory();
    let body_limit = config.uploads.max_file_size_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors_origins = config.server.cors_allowed_origins.clone();

    // Layers added last run first: the request span must exist before
    // authentication records the caller into it.
    let api_router = create_api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(
                    observability::security_headers_middleware,
                ))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer.allow_methods(Any).allow_headers(Any)),
        )
}

fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(movies::list_movies).post(movies::create_movie))
        .route("/movies/promo", get(movies::get_promo))
        .route(
            "/movies/{id}",
            get(movies::get_movie)
                .patch(movies::edit_movie)
                .delete(movies::delete_movie),
        )
        .route("/movies/{id}/comments", get(movies::list_comments))
        .route("/movies/{id}/poster", post(movies::upload_poster))
        .route("/movies/{id}/background", post(movies::upload_background))
        .route("/comments", post(comments::create_comment))
        .route("/users/register", post(users::register))
        .route(
            "/users/login",
            get(users::check_authenticated).post(users::login),
        )
        .route("/users/logout", delete(users::logout))
        .route("/users/favorites", get(users::list_favorites))
        .route(
            "/users/favorites/{movie_id}/{status}",
            post(users::set_favorite_status),
        )
        .route("/users/{user_id}/avatar", post(users::upload_avatar))
        .route("/metrics", get(observability::get_metrics))
        .route("/health", get(observability::health))
}
