use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogImporter, CatalogService, CommentService, Credentials, FavoriteService,
    MovieService, SeaOrmAuthService, SeaOrmCatalogService, SeaOrmCommentService,
    SeaOrmFavoriteService, SeaOrmMovieService, UploadService,
};

/// Every long-lived service, built once at startup.
///
/// The HTTP layer and the CLI commands both start from here.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Arc<Store>,

    pub credentials: Arc<Credentials>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub favorite_service: Arc<dyn FavoriteService>,

    pub movie_service: Arc<dyn MovieService>,

    pub comment_service: Arc<dyn CommentService>,

    pub auth_service: Arc<dyn AuthService>,

    pub upload_service: Arc<UploadService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires the services around an already opened store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let store = Arc::new(store);
        let credentials = Arc::new(Credentials::new(&config.security, &config.auth)?);

        let catalog_service = Arc::new(SeaOrmCatalogService::new(
            store.clone(),
            config.catalog.clone(),
        )) as Arc<dyn CatalogService>;

        let favorite_service = Arc::new(SeaOrmFavoriteService::new(store.clone()))
            as Arc<dyn FavoriteService>;

        let movie_service = Arc::new(SeaOrmMovieService::new(
            store.clone(),
            catalog_service.clone(),
        )) as Arc<dyn MovieService>;

        let comment_service = Arc::new(SeaOrmCommentService::new(store.clone()))
            as Arc<dyn CommentService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), credentials.clone()))
            as Arc<dyn AuthService>;

        let upload_service = Arc::new(UploadService::new(config.uploads.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            credentials,
            catalog_service,
            favorite_service,
            movie_service,
            comment_service,
            auth_service,
            upload_service,
        })
    }

    /// TSV importer sharing this state's store and services.
    #[must_use]
    pub fn importer(&self) -> CatalogImporter {
        CatalogImporter::new(
            self.store.clone(),
            self.auth_service.clone(),
            self.movie_service.clone(),
        )
    }
}
