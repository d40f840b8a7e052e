use axum_helpers::{TokenVerifier, create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::MongoUserRepository;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use api::catalog::Repositories;
use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(url = %config.mongodb.redacted_url(), "Connecting to MongoDB");
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());
    info!(database = config.mongodb.database(), "Connected to MongoDB");

    let state = AppState {
        verifier: TokenVerifier::new(&config.jwt),
        config,
        mongo_client,
        db,
    };

    let catalog = Repositories::new(&state.db);
    let users = MongoUserRepository::new(&state.db);
    catalog.init_indexes().await?;
    users.init_indexes().await?;

    let api_routes = api::routes(&catalog, users, &state.verifier);
    let app = create_router::<openapi::ApiDoc>(api_routes, &state.config.cors)?
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.db.clone()));

    info!("Starting catalog admin API");

    let mongo_client = state.mongo_client.clone();
    create_production_app(app, &state.config.server, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog admin API shutdown complete");
    Ok(())
}
