// src/main.rs

use std::sync::Arc;

use blog_backend::config::Config;
use blog_backend::repository::{MemoryPostRepository, PgPostRepository};
use blog_backend::routes;
use blog_backend::state::{AppState, DynPostRepository};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from .env (if present) and the environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Pick storage
    let posts: DynPostRepository = match &config.database_url {
        Some(url) => Arc::new(PgPostRepository::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, posts are kept in memory and lost on restart");
            Arc::new(MemoryPostRepository::new())
        }
    };

    let addr = config.listen_addr();
    let state = AppState::new(posts, config);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    // Start the server
    axum::serve(listener, app).await?;

    Ok(())
}
