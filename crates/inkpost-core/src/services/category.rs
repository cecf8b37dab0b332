//! Category workflow.

use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Category, CategoryChanges};
use crate::error::{DomainError, RepoError};
use crate::ports::{CategoryRepository, PostRepository};

/// What to do when a category that posts still reference is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryDeletePolicy {
    /// Delete anyway and leave the posts with a dangling category reference.
    Allow,
    /// Refuse with a conflict while any post references the category.
    #[default]
    Restrict,
}

impl FromStr for CategoryDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "restrict" => Ok(Self::Restrict),
            other => Err(format!("unknown category delete policy: {other}")),
        }
    }
}

/// Create, read, update and delete categories.
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    delete_policy: CategoryDeletePolicy,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self {
            categories,
            posts,
            delete_policy: CategoryDeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: CategoryDeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("category name is required".to_string()));
        }

        let category = self.categories.insert(Category::new(name.to_string())).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.find_all().await?)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", id))
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Category, DomainError> {
        if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(DomainError::Validation("category name cannot be empty".to_string()));
        }

        let mut category = self.get_category(id).await?;
        category.apply(changes);

        self.categories
            .update(category)
            .await?
            .ok_or_else(|| DomainError::not_found("category", id))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), DomainError> {
        let category = self.get_category(id).await?;

        let referencing = self.posts.count_by_category(id).await?;
        if referencing > 0 {
            match self.delete_policy {
                CategoryDeletePolicy::Restrict => {
                    return Err(DomainError::Conflict(format!(
                        "category '{}' is still used by {} post(s)",
                        category.name, referencing
                    )));
                }
                CategoryDeletePolicy::Allow => {
                    tracing::warn!(
                        category_id = %id,
                        posts = referencing,
                        "Deleting category still referenced by posts"
                    );
                }
            }
        }

        match self.categories.delete(id).await {
            Ok(()) => {
                tracing::info!(category_id = %id, "Category deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found("category", id)),
            Err(e) => Err(e.into()),
        }
    }
}
