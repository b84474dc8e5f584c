use std::sync::Arc;

use log::info;
use seohub::{
    analysis::fetcher::PageFetcher, build_router, config::AppConfig, db::app_storage::AppStorage,
    state::AppState,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting application with config:");
    info!("  Host: {}", config.host);
    info!("  Port: {}", config.port);
    info!("  Data directory: {}", config.data_dir);
    info!("  Static directory: {:?}", config.static_dir);
    info!("  Fetch timeout: {}s", config.fetch_timeout_secs);
    info!("  API keys configured: {}", config.api_keys.len());

    let app_storage = AppStorage::new(&config.data_dir)?;
    let fetcher = PageFetcher::from_config(&config)?;

    let shared_state = Arc::new(AppState::new(app_storage, config.clone(), fetcher));
    let app = build_router(shared_state);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Server starting on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
