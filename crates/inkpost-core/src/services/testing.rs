//! In-process fakes for service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, User};
use crate::error::{RepoError, StorageError};
use crate::ports::{
    BaseRepository, CategoryRepository, PostRepository, ThumbnailStore, UserRepository,
};
use crate::services::{CategoryService, PostService};

pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Category {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Post {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for User {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Insertion-ordered table with switchable write failures.
pub struct Table<T> {
    rows: Mutex<Vec<T>>,
    fail_writes: AtomicBool,
}

impl<T: Keyed + Clone> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    pub fn seed(&self, row: T) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.rows().into_iter().find(|r| r.key() == id)
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Query("write rejected".to_string()));
        }
        Ok(())
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows().into_iter().filter(|r| pred(r)).collect()
    }
}

#[async_trait]
impl<T> BaseRepository<T, Uuid> for Table<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        Ok(self.get(id))
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        self.check_writable()?;
        self.seed(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<Option<T>, RepoError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.key() == entity.key()) {
            Some(row) => {
                *row = entity.clone();
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.key() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for Table<Category> {
    async fn find_all(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self.rows())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        Ok(self.rows().into_iter().find(|c| c.name == name))
    }
}

#[async_trait]
impl PostRepository for Table<Post> {
    async fn find_all_recent(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.rows();
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(posts)
    }

    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.filter(|p| p.category == category_id);
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_by_creator(&self, creator: Uuid) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.filter(|p| p.creator == creator);
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn count_by_creator(&self, creator: Uuid) -> Result<u64, RepoError> {
        Ok(self.filter(|p| p.creator == creator).len() as u64)
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        Ok(self.filter(|p| p.category == category_id).len() as u64)
    }
}

#[async_trait]
impl UserRepository for Table<User> {
    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.rows())
    }

    async fn adjust_post_count(&self, id: Uuid, delta: i64) -> Result<Option<User>, RepoError> {
        let Some(mut user) = self.get(id) else {
            return Ok(None);
        };
        user.adjust_posts(delta);
        self.update(user).await
    }

    async fn set_post_count(&self, id: Uuid, posts: i64) -> Result<Option<User>, RepoError> {
        let Some(mut user) = self.get(id) else {
            return Ok(None);
        };
        user.posts = posts;
        self.update(user).await
    }
}

/// Thumbnail store backed by a map.
pub struct MemoryThumbnails {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_puts: AtomicBool,
    fail_removes: AtomicBool,
}

impl MemoryThumbnails {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            fail_puts: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.lock().unwrap().contains_key(name)
    }

    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_removes(&self) {
        self.fail_removes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ThumbnailStore for MemoryThumbnails {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("permission denied".to_string()));
        }
        self.files.lock().unwrap().remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.contains(name))
    }
}

/// A full set of fakes wired the way the server wires real adapters.
pub struct Fixture {
    pub categories: Arc<Table<Category>>,
    pub posts: Arc<Table<Post>>,
    pub users: Arc<Table<User>>,
    pub thumbnails: Arc<MemoryThumbnails>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            categories: Arc::new(Table::new()),
            posts: Arc::new(Table::new()),
            users: Arc::new(Table::new()),
            thumbnails: Arc::new(MemoryThumbnails::new()),
        }
    }

    pub fn category_service(&self) -> CategoryService {
        CategoryService::new(self.categories.clone(), self.posts.clone())
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(
            self.posts.clone(),
            self.categories.clone(),
            self.users.clone(),
            self.thumbnails.clone(),
        )
    }

    pub fn add_user(&self, name: &str) -> User {
        let user = User::new(name.to_string(), format!("{name}@example.com"));
        self.users.seed(user.clone());
        user
    }

    pub fn add_category(&self, name: &str) -> Category {
        let category = Category::new(name.to_string());
        self.categories.seed(category.clone());
        category
    }
}
