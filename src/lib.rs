pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{
    AssociationGraph, JsonApiEncoder, JsonFlags, RenderRequest, SchemaProvider, SchemaResolver,
    StaticSchema,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, RecordStore};

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = crate::config::AppConfig::load()?;

    let store = Arc::new(crate::seed::seeded_store()?);
    let state = Arc::new(crate::api::handlers::ViewState::new(store, config.view.clone()));

    let app = crate::api::routes::create_router().with_state(state);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    serve(listener, app).await?;

    Ok(())
}
