//! Post workflow: authorship checks, thumbnail lifecycle and the per-user post counter.
//!
//! The thumbnail store and the record store are not transactional. Writes follow
//! a fixed order so that a failure leaves at most an orphaned file that the
//! service removes again:
//!
//! - create: write file, insert record (remove file on failure), bump counter
//! - edit with thumbnail: write new file, update record (remove new file on
//!   failure), remove previous file
//! - delete: remove file, delete record, decrement counter
//!
//! Counter maintenance and removal of superseded files are best-effort and only
//! logged; [`PostService::reconcile_post_counts`] repairs counter drift.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryRef, CategorySummary, Post, PostForm, PostView, ThumbnailUpload,
    stored_thumbnail_name,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{CategoryRepository, PostRepository, ThumbnailStore, UserRepository};

/// Largest accepted thumbnail, in bytes.
pub const DEFAULT_MAX_THUMBNAIL_BYTES: u64 = 2_000_000;

/// Minimum description length accepted when editing a post.
pub const MIN_DESCRIPTION_CHARS: usize = 12;

/// How a category listing reports a category without posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyListing {
    /// Return an empty list.
    Allow,
    /// Fail with a not-found error.
    NotFound,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
    thumbnails: Arc<dyn ThumbnailStore>,
    max_thumbnail_bytes: u64,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
        thumbnails: Arc<dyn ThumbnailStore>,
    ) -> Self {
        Self {
            posts,
            categories,
            users,
            thumbnails,
            max_thumbnail_bytes: DEFAULT_MAX_THUMBNAIL_BYTES,
        }
    }

    pub fn with_max_thumbnail_bytes(mut self, max: u64) -> Self {
        self.max_thumbnail_bytes = max;
        self
    }

    pub fn max_thumbnail_bytes(&self) -> u64 {
        self.max_thumbnail_bytes
    }

    /// Create a post authored by `creator` and store its thumbnail.
    pub async fn create_post(&self, form: PostForm, creator: Uuid) -> Result<Post, DomainError> {
        let PostForm {
            title,
            category_id,
            description,
            thumbnail,
        } = form;

        let fields_present = [&title, &category_id, &description]
            .iter()
            .all(|field| !field.trim().is_empty());
        let upload = match thumbnail {
            Some(upload) if fields_present => upload,
            _ => {
                tracing::debug!(%creator, "Post rejected: missing fields");
                return Err(DomainError::Validation("missing fields".to_string()));
            }
        };

        let category = self.resolve_category_id(&category_id).await?;
        self.check_thumbnail_size(&upload)?;

        let stored_name = stored_thumbnail_name(&upload.file_name);
        self.store_thumbnail(&stored_name, &upload).await?;

        let post = Post::new(title, category.id, description, stored_name.clone(), creator);
        let post = match self.posts.insert(post).await {
            Ok(post) => post,
            Err(e) => {
                tracing::error!(error = %e, "Post insert failed; discarding stored thumbnail");
                self.discard_thumbnail(&stored_name).await;
                return Err(e.into());
            }
        };

        self.adjust_post_count(creator, 1).await;

        tracing::info!(
            post_id = %post.id,
            %creator,
            thumbnail = %post.thumbnail,
            "Post created"
        );
        Ok(post)
    }

    /// All posts with their category names, most recently updated first.
    pub async fn list_posts(&self) -> Result<Vec<PostView>, DomainError> {
        let posts = self.posts.find_all_recent().await?;
        let categories: HashMap<Uuid, CategorySummary> = self
            .categories
            .find_all()
            .await?
            .iter()
            .map(|category| (category.id, CategorySummary::from(category)))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| {
                let category = categories.get(&post.category).cloned();
                PostView::new(post, category)
            })
            .collect())
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// Posts in a category with its name embedded, most recently created first.
    pub async fn list_posts_by_category(
        &self,
        reference: CategoryRef,
        empty: EmptyListing,
    ) -> Result<Vec<PostView>, DomainError> {
        let category = self.resolve_category(&reference).await?;
        let posts = self.posts.find_by_category(category.id).await?;

        if posts.is_empty() && empty == EmptyListing::NotFound {
            return Err(DomainError::not_found("posts", format!("in category {}", category.name)));
        }

        let summary = CategorySummary::from(&category);
        Ok(posts
            .into_iter()
            .map(|post| PostView::new(post, Some(summary.clone())))
            .collect())
    }

    /// Posts by an author, most recently created first. An empty list is not an error.
    pub async fn list_posts_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_creator(user_id).await?)
    }

    /// Edit a post owned by `actor`, optionally replacing its thumbnail.
    pub async fn edit_post(
        &self,
        id: Uuid,
        form: PostForm,
        actor: Uuid,
    ) -> Result<Post, DomainError> {
        let PostForm {
            title,
            category_id,
            description,
            thumbnail,
        } = form;

        if title.trim().is_empty()
            || category_id.trim().is_empty()
            || description.chars().count() < MIN_DESCRIPTION_CHARS
        {
            return Err(DomainError::Validation(format!(
                "title and category are required and the description needs at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }

        let mut post = self.get_post(id).await?;
        if !post.is_created_by(actor) {
            tracing::warn!(post_id = %id, %actor, "Edit refused: actor is not the creator");
            return Err(DomainError::Forbidden("couldn't update post".to_string()));
        }

        let category = self.resolve_category_id(&category_id).await?;
        post.title = title;
        post.category = category.id;
        post.description = description;
        post.updated_at = Utc::now();

        let Some(upload) = thumbnail else {
            return self
                .posts
                .update(post)
                .await?
                .ok_or_else(|| DomainError::Internal(format!("post {id} vanished during update")));
        };

        self.check_thumbnail_size(&upload)?;

        let replacement = stored_thumbnail_name(&upload.file_name);
        self.store_thumbnail(&replacement, &upload).await?;
        let previous = std::mem::replace(&mut post.thumbnail, replacement.clone());

        let updated = match self.posts.update(post).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.discard_thumbnail(&replacement).await;
                return Err(DomainError::Internal(format!(
                    "post {id} vanished during update"
                )));
            }
            Err(e) => {
                self.discard_thumbnail(&replacement).await;
                return Err(e.into());
            }
        };

        self.discard_thumbnail(&previous).await;
        tracing::info!(post_id = %id, thumbnail = %updated.thumbnail, "Post thumbnail replaced");
        Ok(updated)
    }

    /// Delete a post owned by `actor` together with its thumbnail.
    pub async fn delete_post(&self, id: Uuid, actor: Uuid) -> Result<Post, DomainError> {
        let post = self.get_post(id).await?;
        if !post.is_created_by(actor) {
            tracing::warn!(post_id = %id, %actor, "Delete refused: actor is not the creator");
            return Err(DomainError::Forbidden("couldn't delete post".to_string()));
        }

        self.thumbnails.remove(&post.thumbnail).await.map_err(|e| {
            tracing::error!(post_id = %id, error = %e, "Thumbnail removal failed");
            DomainError::from(e)
        })?;

        match self.posts.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::not_found("post", id)),
            Err(e) => {
                tracing::error!(
                    post_id = %id,
                    thumbnail = %post.thumbnail,
                    error = %e,
                    "Post record delete failed after its thumbnail was removed"
                );
                return Err(e.into());
            }
        }

        self.adjust_post_count(post.creator, -1).await;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(post)
    }

    /// Recompute every user's post counter from the posts they own.
    ///
    /// Returns the number of users whose counter was corrected.
    pub async fn reconcile_post_counts(&self) -> Result<usize, DomainError> {
        let mut corrected = 0;

        for user in self.users.find_all().await? {
            let actual = self.posts.count_by_creator(user.id).await? as i64;
            if actual == user.posts {
                continue;
            }

            tracing::warn!(
                user_id = %user.id,
                recorded = user.posts,
                actual,
                "Post counter drifted; correcting"
            );
            self.users.set_post_count(user.id, actual).await?;
            corrected += 1;
        }

        Ok(corrected)
    }

    async fn resolve_category(&self, reference: &CategoryRef) -> Result<Category, DomainError> {
        let found = match reference {
            CategoryRef::Id(id) => self.categories.find_by_id(*id).await?,
            CategoryRef::Name(name) => match self.categories.find_by_name(name).await? {
                Some(category) => Some(category),
                None => match Uuid::parse_str(name) {
                    Ok(id) => self.categories.find_by_id(id).await?,
                    Err(_) => None,
                },
            },
        };

        found.ok_or_else(|| {
            let key = match reference {
                CategoryRef::Id(id) => id.to_string(),
                CategoryRef::Name(name) => name.clone(),
            };
            DomainError::not_found("category", key)
        })
    }

    async fn resolve_category_id(&self, raw: &str) -> Result<Category, DomainError> {
        let raw = raw.trim();
        match Uuid::parse_str(raw) {
            Ok(id) => self.resolve_category(&CategoryRef::Id(id)).await,
            Err(_) => Err(DomainError::not_found("category", raw)),
        }
    }

    fn check_thumbnail_size(&self, upload: &ThumbnailUpload) -> Result<(), DomainError> {
        if upload.exceeds(self.max_thumbnail_bytes) {
            tracing::debug!(
                size = upload.size,
                max = self.max_thumbnail_bytes,
                "Thumbnail rejected"
            );
            return Err(DomainError::Validation("thumbnail too large".to_string()));
        }
        Ok(())
    }

    async fn store_thumbnail(&self, name: &str, upload: &ThumbnailUpload) -> Result<(), DomainError> {
        self.thumbnails.put(name, &upload.bytes).await.map_err(|e| {
            tracing::error!(thumbnail = %name, error = %e, "Thumbnail upload failed");
            DomainError::Internal(format!("thumbnail upload failed: {e}"))
        })
    }

    async fn discard_thumbnail(&self, name: &str) {
        if let Err(e) = self.thumbnails.remove(name).await {
            tracing::warn!(thumbnail = %name, error = %e, "Orphaned thumbnail left in storage");
        }
    }

    async fn adjust_post_count(&self, user_id: Uuid, delta: i64) {
        match self.users.adjust_post_count(user_id, delta).await {
            Ok(Some(user)) if user.posts < 0 => {
                tracing::warn!(
                    %user_id,
                    delta,
                    posts = user.posts,
                    "Post counter went negative; it has drifted from the user's posts"
                );
            }
            Ok(Some(user)) => {
                tracing::debug!(%user_id, posts = user.posts, "Post counter updated");
            }
            Ok(None) => {
                tracing::warn!(%user_id, delta, "Post counter not updated: user record missing");
            }
            Err(e) => {
                tracing::warn!(%user_id, delta, error = %e, "Post counter update failed");
            }
        }
    }
}
