use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, ThumbnailUpload};

/// Post entity - an authored article with a thumbnail stored outside the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub category: Uuid,
    pub description: String,
    /// Stored filename of the thumbnail.
    pub thumbnail: String,
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(
        title: String,
        category: Uuid,
        description: String,
        thumbnail: String,
        creator: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            category,
            description,
            thumbnail,
            creator,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_created_by(&self, actor: Uuid) -> bool {
        self.creator == actor
    }
}

/// Category fields embedded in post listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

/// A post as shown in listings, with its category resolved.
///
/// `category` is `None` (JSON `null`) when the referenced category was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub category: Option<CategorySummary>,
    pub description: String,
    pub thumbnail: String,
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: Post, category: Option<CategorySummary>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            category,
            description: post.description,
            thumbnail: post.thumbnail,
            creator: post.creator,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Submitted post fields, shared by create and edit.
///
/// `category_id` is kept raw so that a blank value is reported as a missing
/// field before any lookup happens.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub title: String,
    pub category_id: String,
    pub description: String,
    pub thumbnail: Option<ThumbnailUpload>,
}
