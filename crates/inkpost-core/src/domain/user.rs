use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - the author view the post workflow depends on.
///
/// `posts` is a denormalized counter maintained by the post service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub posts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(name: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            posts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shift the post counter. A negative result is left in place so that
    /// drift stays visible until reconciliation.
    pub fn adjust_posts(&mut self, delta: i64) {
        self.posts += delta;
        self.updated_at = Utc::now();
    }
}
