use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aws_clients;
mod config;
mod domain;
mod errors;
mod fetcher;
mod giphy;
mod handlers;
mod keys;
mod models;
mod routes;
mod startup;
mod storage;
mod thumbnailer;

use crate::config::Config;
use crate::domain::{ObjectStore, TrendingSource};
use crate::errors::AppError;
use crate::giphy::GiphyClient;
use crate::storage::S3ObjectStore;

/// AppState holds the injected collaborators shared by both trigger
/// endpoints. The trait objects let tests substitute in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub trending: Arc<dyn TrendingSource>,
    pub gif_limit: u32,
    pub fan_out_limit: usize,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "giphy_archiver=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Loads .env (if present) and the environment
    let config = Config::load()?;
    tracing::info!(
        bucket = %config.bucket_name,
        gif_limit = config.gif_limit,
        fan_out_limit = config.fan_out_limit,
        "Configuration loaded"
    );

    tracing::info!("Initializing AWS S3 client...");
    let sdk_config = aws_clients::create_sdk_config(&config).await?;
    let s3_client = aws_clients::create_s3_client(&sdk_config);

    // NOTE: Creating the bucket here isn't ideal for production.
    // Use IaC (Terraform, CDK, etc.) or manual setup.
    startup::ensure_s3_bucket_exists(&s3_client, &config.bucket_name, &config.aws_region).await?;

    // --- Application state: collaborators constructed once, injected ---
    let store: Arc<dyn ObjectStore> =
        Arc::new(S3ObjectStore::new(s3_client, config.bucket_name.clone()));
    let trending: Arc<dyn TrendingSource> = Arc::new(GiphyClient::new(
        config.giphy_base_url.clone(),
        config.giphy_api_key.clone(),
    ));

    let state = Arc::new(AppState {
        store,
        trending,
        gif_limit: config.gif_limit,
        fan_out_limit: config.fan_out_limit,
    });

    let app = routes::create_router(state);

    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
