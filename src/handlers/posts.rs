// src/handlers/posts.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{PostFields, PostPayload, PostSummary},
    state::DynPostRepository,
    utils::{
        html::{ContentSanitizer, excerpt},
        slug::{assign_slug, slug_for_update},
    },
};

/// Length of the plain-text preview on list cards.
const EXCERPT_CHARS: usize = 120;

/// List all posts (Recent first), each with a plain-text excerpt.
pub async fn list_posts(
    State(posts): State<DynPostRepository>,
) -> Result<impl IntoResponse, AppError> {
    let summaries: Vec<PostSummary> = posts
        .list()
        .await?
        .into_iter()
        .map(|post| PostSummary {
            excerpt: excerpt(&post.content, EXCERPT_CHARS),
            post,
        })
        .collect();

    Ok(Json(json!({ "posts": summaries })))
}

/// Get a single post by slug.
pub async fn get_post(
    State(posts): State<DynPostRepository>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = posts
        .find_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(json!({ "post": post })))
}

/// Create a new post.
/// The slug is derived from the title; content is sanitized before storage.
pub async fn create_post(
    State(posts): State<DynPostRepository>,
    State(sanitizer): State<Arc<ContentSanitizer>>,
    Json(payload): Json<PostPayload>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Unique slug + clean content
    let slug = assign_slug(&payload.title, posts.as_ref(), None).await?;
    let content = sanitizer.sanitize(&payload.content);

    // 3. Insert Post
    let post = posts
        .insert(PostFields {
            title: payload.title.trim().to_string(),
            slug,
            content,
        })
        .await?;

    tracing::info!(post_id = post.id, slug = %post.slug, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "post": {
                "id": post.id,
                "title": post.title,
                "slug": post.slug,
                "created_at": post.created_at,
            }
        })),
    ))
}

/// Update a post by slug.
/// The slug only changes when the title does.
pub async fn update_post(
    State(posts): State<DynPostRepository>,
    State(sanitizer): State<Arc<ContentSanitizer>>,
    Path(slug): Path<String>,
    Json(payload): Json<PostPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = posts
        .find_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let new_slug = slug_for_update(&existing, &payload.title, posts.as_ref()).await?;
    let content = sanitizer.sanitize(&payload.content);

    let post = posts
        .update(
            existing.id,
            PostFields {
                title: payload.title.trim().to_string(),
                slug: new_slug,
                content,
            },
        )
        .await?;

    if post.slug != existing.slug {
        tracing::info!(post_id = post.id, from = %existing.slug, to = %post.slug, "Post slug changed");
    }

    Ok(Json(json!({ "success": true, "post": post })))
}

/// Delete a post by slug.
pub async fn delete_post(
    State(posts): State<DynPostRepository>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !posts.delete_by_slug(&slug).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    tracing::info!(slug = %slug, "Post deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Post deleted successfully",
    })))
}
