// src/utils/slug.rs

use std::fmt;

use async_trait::async_trait;

use crate::{error::AppError, models::post::Post};

/// Characters dropped from a title before it is turned into a slug,
/// so that "Don't" becomes "dont" rather than "don-t".
const REMOVED_CHARS: &[char] = &['*', '+', '~', '.', '(', ')', '\'', '"', '!', ':', '@'];

/// Existence check used while resolving slug collisions.
///
/// Implemented by the post storage. `exclude_id` lets an update ignore the
/// record that is being renamed.
#[async_trait]
pub trait SlugLookup: Send + Sync {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError>;
}

#[derive(Debug)]
pub enum SlugError {
    /// Title is blank, or nothing slug-worthy is left after normalization.
    InvalidInput(String),

    /// The storage lookup failed. Carried through untouched.
    Lookup(AppError),
}

impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlugError::InvalidInput(msg) => write!(f, "invalid title: {}", msg),
            SlugError::Lookup(err) => write!(f, "slug lookup failed: {}", err),
        }
    }
}

impl std::error::Error for SlugError {}

/// Normalizes a title into its base slug.
///
/// Transliterates to ASCII, lower-cases, strips `REMOVED_CHARS` and joins
/// the remaining alphanumeric runs with single hyphens. Transliteration
/// comes first so typographic quotes (`’`) are stripped like plain ones.
pub fn base_slug(title: &str) -> Result<String, SlugError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(SlugError::InvalidInput("Title must not be empty".to_string()));
    }

    let stripped: String = deunicode::deunicode(trimmed)
        .to_lowercase()
        .chars()
        .filter(|c| !REMOVED_CHARS.contains(c))
        .collect();

    let slug = slug::slugify(stripped);
    if slug.is_empty() {
        return Err(SlugError::InvalidInput(format!(
            "Title '{}' does not contain any characters usable in a URL",
            trimmed
        )));
    }

    Ok(slug)
}

/// Derives a slug for `title` that no other post is using.
///
/// Returns the base slug when it is free, otherwise the first free
/// `base-1`, `base-2`, ... candidate. The loop has no upper bound.
pub async fn assign_slug<L>(
    title: &str,
    lookup: &L,
    exclude_id: Option<i64>,
) -> Result<String, SlugError>
where
    L: SlugLookup + ?Sized,
{
    let base = base_slug(title)?;

    if !lookup
        .slug_exists(&base, exclude_id)
        .await
        .map_err(SlugError::Lookup)?
    {
        return Ok(base);
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !lookup
            .slug_exists(&candidate, exclude_id)
            .await
            .map_err(SlugError::Lookup)?
        {
            tracing::debug!(base = %base, slug = %candidate, "Resolved slug collision");
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Picks the slug for an edited post.
///
/// An unchanged title keeps the stored slug without touching storage.
/// A changed title gets a fresh slug, ignoring the post's own record.
pub async fn slug_for_update<L>(
    existing: &Post,
    new_title: &str,
    lookup: &L,
) -> Result<String, SlugError>
where
    L: SlugLookup + ?Sized,
{
    if new_title.trim() == existing.title {
        return Ok(existing.slug.clone());
    }

    assign_slug(new_title, lookup, Some(existing.id)).await
}
