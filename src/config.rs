use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// JWT signing algorithms accepted in `[auth].jwt_algorithm`.
pub const SUPPORTED_JWT_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

/// Shortest JWT secret accepted by [`Config::validate`], in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub auth: AuthConfig,

    pub uploads: UploadConfig,

    pub catalog: CatalogConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/marquee.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens. Must be overridden in production,
    /// usually through `MARQUEE_JWT_SECRET`.
    pub jwt_secret: String,

    /// One of HS256, HS384, HS512
    pub jwt_algorithm: String,

    pub token_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: "HS256".to_string(),
            token_ttl_minutes: 60 * 24 * 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub directory: String,

    pub max_file_size_bytes: usize,

    /// Lowercase extensions without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: "upload".to_string(),
            max_file_size_bytes: 5 * 1024 * 1024,
            allowed_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_movie_limit: u64,

    pub max_movie_limit: u64,

    pub comment_page_size: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_movie_limit: 60,
            max_movie_limit: 500,
            comment_page_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "marquee".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies `MARQUEE_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MARQUEE_DATABASE_URL") {
            self.general.database_url = url;
        }
        if let Some(port) = lookup("MARQUEE_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("MARQUEE_PORT is not a valid port: {port}"))?;
        }
        if let Some(secret) = lookup("MARQUEE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(dir) = lookup("MARQUEE_UPLOAD_DIRECTORY") {
            self.uploads.directory = dir;
        }
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("marquee").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".marquee").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes a default config to `path` unless a file is already there.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret must be set (or provide MARQUEE_JWT_SECRET)");
        }

        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            anyhow::bail!("auth.jwt_secret must be at least {MIN_JWT_SECRET_BYTES} bytes long");
        }

        if !SUPPORTED_JWT_ALGORITHMS.contains(&self.auth.jwt_algorithm.as_str()) {
            anyhow::bail!(
                "Unsupported auth.jwt_algorithm '{}', expected one of {}",
                self.auth.jwt_algorithm,
                SUPPORTED_JWT_ALGORITHMS.join(", ")
            );
        }

        if self.auth.token_ttl_minutes == 0 {
            anyhow::bail!("auth.token_ttl_minutes must be > 0");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.catalog.default_movie_limit == 0
            || self.catalog.default_movie_limit > self.catalog.max_movie_limit
        {
            anyhow::bail!("catalog.default_movie_limit must be between 1 and catalog.max_movie_limit");
        }

        if self.catalog.comment_page_size == 0 {
            anyhow::bail!("catalog.comment_page_size must be > 0");
        }

        if self.uploads.max_file_size_bytes == 0 {
            anyhow::bail!("uploads.max_file_size_bytes must be > 0");
        }

        if self.uploads.allowed_extensions.is_empty() {
            anyhow::bail!("uploads.allowed_extensions cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = "a".repeat(MIN_JWT_SECRET_BYTES);
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog.default_movie_limit, 60);
        assert_eq!(config.catalog.comment_page_size, 50);
        assert_eq!(config.auth.jwt_algorithm, "HS256");
        assert_eq!(config.uploads.allowed_extensions, vec!["jpg", "jpeg", "png"]);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[auth]"));
        assert!(toml_str.contains("[catalog]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [catalog]
            comment_page_size = 20
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.catalog.comment_page_size, 20);

        assert_eq!(config.catalog.default_movie_limit, 60);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| match key {
                "MARQUEE_PORT" => Some("8081".to_string()),
                "MARQUEE_JWT_SECRET" => Some("s3cret".to_string()),
                "MARQUEE_DATABASE_URL" => Some("sqlite::memory:".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.general.database_url, "sqlite::memory:");
        assert_eq!(config.uploads.directory, "upload");
    }

    #[test]
    fn test_invalid_port_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| {
            (key == "MARQUEE_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(valid_config().validate().is_ok());

        assert!(Config::default().validate().is_err(), "empty secret");

        let mut short = valid_config();
        short.auth.jwt_secret = "short".to_string();
        assert!(short.validate().is_err());

        let mut algorithm = valid_config();
        algorithm.auth.jwt_algorithm = "RS256".to_string();
        assert!(algorithm.validate().is_err());

        let mut limits = valid_config();
        limits.catalog.default_movie_limit = limits.catalog.max_movie_limit + 1;
        assert!(limits.validate().is_err());

        let mut port = valid_config();
        port.server.port = 0;
        assert!(port.validate().is_err());
    }
}
