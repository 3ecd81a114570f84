use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, repository::PostRepository, utils::html::ContentSanitizer};

pub type DynPostRepository = Arc<dyn PostRepository>;

#[derive(Clone)]
pub struct AppState {
    pub posts: DynPostRepository,
    pub sanitizer: Arc<ContentSanitizer>,
    pub config: Config,
}

impl AppState {
    /// State with the standard sanitizer configuration.
    pub fn new(posts: DynPostRepository, config: Config) -> Self {
        Self {
            posts,
            sanitizer: Arc::new(ContentSanitizer::new()),
            config,
        }
    }
}

impl FromRef<AppState> for DynPostRepository {
    fn from_ref(state: &AppState) -> Self {
        state.posts.clone()
    }
}

impl FromRef<AppState> for Arc<ContentSanitizer> {
    fn from_ref(state: &AppState) -> Self {
        state.sanitizer.clone()
    }
}
