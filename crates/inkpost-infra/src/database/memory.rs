//! In-memory repositories - used when no database is configured.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpost_core::domain::{Category, Post, User};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, CategoryRepository, PostRepository, UserRepository};

/// A record with a stable identifier.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

impl Record for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Post {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// HashMap-backed repository with an async RwLock.
pub struct InMemoryRepository<T> {
    store: RwLock<HashMap<Uuid, T>>,
}

pub type InMemoryCategoryRepository = InMemoryRepository<Category>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryUserRepository = InMemoryRepository<User>;

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    async fn select<K: Ord>(&self, keep: impl Fn(&T) -> bool, sort_key: impl Fn(&T) -> K) -> Vec<T> {
        let store = self.store.read().await;
        let mut rows: Vec<T> = store.values().filter(|r| keep(r)).cloned().collect();
        rows.sort_by_key(|r| sort_key(r));
        rows
    }

    async fn modify(&self, id: Uuid, change: impl FnOnce(&mut T)) -> Option<T> {
        let mut store = self.store.write().await;
        let row = store.get_mut(&id)?;
        change(row);
        Some(row.clone())
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&entity.id()) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<Option<T>, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&entity.id()) {
            Some(row) => {
                *row = entity.clone();
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self.select(|_| true, |c| c.created_at).await)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let matches = self.select(|c| c.name == name, |c| c.created_at).await;
        Ok(matches.into_iter().next())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all_recent(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .select(|_| true, |p| std::cmp::Reverse(p.updated_at))
            .await)
    }

    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .select(
                |p| p.category == category_id,
                |p| std::cmp::Reverse(p.created_at),
            )
            .await)
    }

    async fn find_by_creator(&self, creator: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .select(|p| p.creator == creator, |p| std::cmp::Reverse(p.created_at))
            .await)
    }

    async fn count_by_creator(&self, creator: Uuid) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().filter(|p| p.creator == creator).count() as u64)
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().filter(|p| p.category == category_id).count() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.select(|_| true, |u| u.created_at).await)
    }

    async fn adjust_post_count(&self, id: Uuid, delta: i64) -> Result<Option<User>, RepoError> {
        Ok(self.modify(id, |user| user.adjust_posts(delta)).await)
    }

    async fn set_post_count(&self, id: Uuid, posts: i64) -> Result<Option<User>, RepoError> {
        Ok(self
            .modify(id, |user| {
                user.posts = posts;
                user.updated_at = chrono::Utc::now();
            })
            .await)
    }
}
