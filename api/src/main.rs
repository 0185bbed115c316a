use actix_web::{web, HttpServer};
use tracing::info;

use qz_api::{create_app, telemetry, AppState};
use qz_infra::build_container;
use qz_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    telemetry::init_tracing(&config.logging)?;
    info!(environment = %config.environment, "Starting QuizPrep API server");

    let container = build_container(&config).for_environment(config.environment)?;
    let state = AppState::from_container(&container).await?;
    state.context.initialize().await?;

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let data = web::Data::new(state.clone());
    let mut server = HttpServer::new(move || create_app(data.clone()))
        .shutdown_timeout(config.server.shutdown_timeout);
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    if let Some(database) = &state.database {
        database.shutdown().await;
    }
    info!("Server stopped");
    Ok(())
}
