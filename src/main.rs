use axum::serve;
use jsonapi_view::api::handlers::ViewState;
use jsonapi_view::api::routes::create_router;
use jsonapi_view::config::AppConfig;
use jsonapi_view::seed;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} environment={:?}",
        config.server.host,
        config.server.port,
        config.view.environment
    );

    let store = Arc::new(seed::seeded_store()?);
    let state = Arc::new(ViewState::new(store, config.view.clone()));

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("JSON:API server running on http://{}", bind_address);

    serve(listener, create_router().with_state(state)).await?;

    Ok(())
}
