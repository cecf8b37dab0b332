//! Application services - the category and post workflows.

mod category;
mod post;

#[cfg(test)]
mod testing;

pub use category::{CategoryDeletePolicy, CategoryService};
pub use post::{DEFAULT_MAX_THUMBNAIL_BYTES, EmptyListing, MIN_DESCRIPTION_CHARS, PostService};
