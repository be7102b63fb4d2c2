pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod favorite_service;
pub mod favorite_service_impl;
pub use favorite_service::{FavoriteError, FavoriteService};
pub use favorite_service_impl::SeaOrmFavoriteService;

pub mod movie_service;
pub mod movie_service_impl;
pub use movie_service::{MovieError, MovieService};
pub use movie_service_impl::SeaOrmMovieService;

pub mod comment_service;
pub mod comment_service_impl;
pub use comment_service::{CommentError, CommentService};
pub use comment_service_impl::SeaOrmCommentService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoggedUser, NewAccount};
pub use auth_service_impl::SeaOrmAuthService;

pub mod credentials;
pub use credentials::{CredentialError, Credentials, TokenClaims, TokenSubject};

pub mod upload;
pub use upload::{UploadError, UploadKind, UploadService};

pub mod import;
pub use import::{CatalogImporter, ImportError, ImportSummary};

pub mod generator;
pub use generator::{GeneratorError, MockData};
