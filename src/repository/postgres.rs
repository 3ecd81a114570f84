// src/repository/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    error::AppError,
    models::post::{Post, PostFields},
    repository::PostRepository,
    utils::slug::SlugLookup,
};

const CONNECT_ATTEMPTS: u32 = 5;

/// PostgreSQL-backed storage. `posts.slug` carries a UNIQUE constraint.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with retry and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= CONNECT_ATTEMPTS {
                        return Err(AppError::InternalServerError(format!(
                            "Failed to connect to database after {} attempts: {}",
                            CONNECT_ATTEMPTS, e
                        )));
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        tracing::info!("Database connected...");

        tracing::info!("Running migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied successfully.");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SlugLookup for PgPostRepository {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM posts
                WHERE slug = $1
                  AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, slug, content, created_at, updated_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::from(e)
        })?;

        Ok(posts)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, slug, content, created_at, updated_at
            FROM posts
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn insert(&self, fields: PostFields) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, slug, content)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, content, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::from(e)
        })?;

        Ok(post)
    }

    async fn update(&self, id: i64, fields: PostFields) -> Result<Post, AppError> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $1, slug = $2, content = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, title, slug, content, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::from(e)
        })?
        .ok_or(AppError::NotFound("Post not found".to_string()))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete post: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
