use anyhow::Context;
use tracing_subscriber::EnvFilter;

use taste_twin::api::{create_router, AppState};
use taste_twin::config::Config;
use taste_twin::services::loader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taste_twin=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let dataset = loader::load_from_paths(&config.ratings_path, &config.movies_path)
        .context("Failed to load ratings dataset")?;

    let state = AppState::new(dataset, config.recommender_settings());
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, min_votes = config.min_votes, "Server running");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
