//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use inkpost_core::services::{CategoryDeletePolicy, DEFAULT_MAX_THUMBNAIL_BYTES};
use inkpost_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Directory holding stored thumbnails.
    pub upload_dir: PathBuf,
    pub max_thumbnail_bytes: u64,
    pub category_delete_policy: CategoryDeletePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            upload_dir: PathBuf::from("uploads"),
            max_thumbnail_bytes: DEFAULT_MAX_THUMBNAIL_BYTES,
            category_delete_policy: CategoryDeletePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(10),
        });

        let category_delete_policy = match env::var("CATEGORY_DELETE_POLICY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; falling back to restrict", e);
                CategoryDeletePolicy::Restrict
            }),
            Err(_) => defaults.category_delete_policy,
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            database,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_thumbnail_bytes: parse_var("MAX_THUMBNAIL_BYTES")
                .unwrap_or(defaults.max_thumbnail_bytes),
            category_delete_policy,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
