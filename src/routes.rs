// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{health, posts},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Post API under `/api/posts`.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (post storage, sanitizer, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/create", post(posts::create_post))
        .route(
            "/{slug}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/posts", post_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
