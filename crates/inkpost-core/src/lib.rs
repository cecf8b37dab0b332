//! # Inkpost Core
//!
//! The domain layer of the Inkpost blogging backend.
//! This crate contains the post and category workflows with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{CategoryService, PostService};
