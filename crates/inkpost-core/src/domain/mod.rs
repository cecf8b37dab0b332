//! Domain entities - the core business objects.

mod category;
mod post;
mod thumbnail;
mod user;

pub use category::{Category, CategoryChanges, CategoryRef};
pub use post::{CategorySummary, Post, PostForm, PostView};
pub use thumbnail::{ThumbnailUpload, stored_thumbnail_name};
pub use user::User;
