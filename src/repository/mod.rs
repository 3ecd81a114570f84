// src/repository/mod.rs

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::post::{Post, PostFields},
    utils::slug::SlugLookup,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryPostRepository;
pub use postgres::PgPostRepository;

/// Post storage.
///
/// Every implementation must reject a second post with the same slug
/// (`AppError::Conflict`); slug assignment alone cannot rule out races.
#[async_trait]
pub trait PostRepository: SlugLookup {
    /// All posts, newest first.
    async fn list(&self) -> Result<Vec<Post>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, AppError>;

    /// Stores a new post; id and both timestamps are assigned here.
    async fn insert(&self, fields: PostFields) -> Result<Post, AppError>;

    /// Overwrites title, slug and content and refreshes `updated_at`.
    async fn update(&self, id: i64, fields: PostFields) -> Result<Post, AppError>;

    /// Returns `false` when no post had that slug.
    async fn delete_by_slug(&self, slug: &str) -> Result<bool, AppError>;
}
