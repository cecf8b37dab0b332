use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity. Returns `None` when the record no longer exists.
    async fn update(&self, entity: T) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories in the store's natural order.
    async fn find_all(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, most recently updated first.
    async fn find_all_recent(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts in a category, most recently created first.
    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Posts by an author, most recently created first.
    async fn find_by_creator(&self, creator: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn count_by_creator(&self, creator: Uuid) -> Result<u64, RepoError>;

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError>;
}

/// User repository with the counter operations used by the post workflow.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;

    /// Read-modify-write of the post counter. Not isolated against
    /// concurrent adjustments of the same user.
    async fn adjust_post_count(&self, id: Uuid, delta: i64) -> Result<Option<User>, RepoError>;

    /// Overwrite the post counter.
    async fn set_post_count(&self, id: Uuid, posts: i64) -> Result<Option<User>, RepoError>;
}
