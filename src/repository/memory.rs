//! In-memory post storage - used when no database is configured, and by tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::post::{Post, PostFields},
    repository::PostRepository,
    utils::slug::SlugLookup,
};

struct Store {
    posts: Vec<Post>,
    next_id: i64,
}

/// Posts kept in a `Vec` behind an async RwLock.
///
/// Enforces slug uniqueness the same way the database constraint does.
/// Data is lost on process restart.
pub struct MemoryPostRepository {
    store: RwLock<Store>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                posts: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> bool {
        self.posts
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != exclude_id)
    }
}

fn slug_conflict() -> AppError {
    AppError::Conflict("A post with this slug already exists".to_string())
}

#[async_trait]
impl SlugLookup for MemoryPostRepository {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError> {
        Ok(self.store.read().await.slug_taken(slug, exclude_id))
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let mut posts = self.store.read().await.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, AppError> {
        let store = self.store.read().await;
        Ok(store.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn insert(&self, fields: PostFields) -> Result<Post, AppError> {
        let mut store = self.store.write().await;
        if store.slug_taken(&fields.slug, None) {
            return Err(slug_conflict());
        }

        let now = Utc::now();
        let post = Post {
            id: store.next_id,
            title: fields.title,
            slug: fields.slug,
            content: fields.content,
            created_at: now,
            updated_at: now,
        };
        store.next_id += 1;
        store.posts.push(post.clone());

        Ok(post)
    }

    async fn update(&self, id: i64, fields: PostFields) -> Result<Post, AppError> {
        let mut store = self.store.write().await;
        if store.slug_taken(&fields.slug, Some(id)) {
            return Err(slug_conflict());
        }

        let post = store
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound("Post not found".to_string()))?;

        post.title = fields.title;
        post.slug = fields.slug;
        post.content = fields.content;
        post.updated_at = Utc::now();

        Ok(post.clone())
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let before = store.posts.len();
        store.posts.retain(|p| p.slug != slug);
        Ok(store.posts.len() < before)
    }
}
