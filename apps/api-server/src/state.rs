//! Application state - shared across all handlers.

use std::io;
use std::sync::Arc;

use inkpost_core::ports::{
    CategoryRepository, PostRepository, ThumbnailStore, TokenService, UserRepository,
};
use inkpost_core::{CategoryService, PostService};
use inkpost_infra::storage::LocalThumbnailStore;
use inkpost_infra::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use inkpost_infra::{PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryService>,
    pub posts: Arc<PostService>,
    pub users: Arc<dyn UserRepository>,
}

/// The record-store adapters the services run on.
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    /// Connect to PostgreSQL when configured, otherwise fall back to memory.
    #[cfg(feature = "postgres")]
    async fn from_config(config: &AppConfig) -> Self {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match inkpost_infra::database::connect(db_config).await {
            Ok(conn) => Self {
                categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                users: Arc::new(PostgresUserRepository::new(conn)),
            },
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn from_config(_config: &AppConfig) -> Self {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory()
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> io::Result<Self> {
        let repositories = Repositories::from_config(config).await;

        let thumbnails = LocalThumbnailStore::new(&config.upload_dir);
        thumbnails.init().await.map_err(io::Error::other)?;

        let state = Self::from_parts(repositories, Arc::new(thumbnails), config);
        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire services over the given adapters.
    pub fn from_parts(
        repositories: Repositories,
        thumbnails: Arc<dyn ThumbnailStore>,
        config: &AppConfig,
    ) -> Self {
        let categories = CategoryService::new(
            repositories.categories.clone(),
            repositories.posts.clone(),
        )
        .with_delete_policy(config.category_delete_policy);

        let posts = PostService::new(
            repositories.posts,
            repositories.categories,
            repositories.users.clone(),
            thumbnails,
        )
        .with_max_thumbnail_bytes(config.max_thumbnail_bytes);

        Self {
            categories: Arc::new(categories),
            posts: Arc::new(posts),
            users: repositories.users,
        }
    }
}

/// Token validation for the bearer-token gate.
pub fn token_service() -> Arc<dyn TokenService> {
    Arc::new(inkpost_infra::JwtTokenService::from_env())
}
