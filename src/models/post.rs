use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,

    /// Sanitized HTML.
    pub content: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List entry: the post plus a plain-text preview for cards.
#[derive(Debug, Serialize)]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: Post,
    pub excerpt: String,
}

/// DTO for creating or updating a post.
///
/// Missing fields deserialize as empty strings so they are reported by
/// validation with a 400 rather than rejected by the JSON extractor.
#[derive(Debug, Deserialize, Validate)]
pub struct PostPayload {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title and content are required"))]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title and content are required"))]
    pub content: String,
}

/// Values written to storage on insert or update.
#[derive(Debug, Clone)]
pub struct PostFields {
    pub title: String,
    pub slug: String,
    pub content: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
