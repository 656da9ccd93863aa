/// ImageShare Auth Service - Main entry point
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use auth_service::{
    config::Config,
    db::{PgImageRepository, PgUserRepository},
    handlers, telemetry, AppState,
};
use crypto_core::{validate_secret_strength, SecretStrength, TokenService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env().context("Failed to load configuration from environment")?;

    match validate_secret_strength(&config.jwt_secret) {
        SecretStrength::Weak => tracing::warn!("JWT_SECRET is weak; use at least 32 random bytes"),
        SecretStrength::Acceptable => tracing::info!("JWT_SECRET strength acceptable"),
        SecretStrength::Strong => {}
    }

    let tokens = Arc::new(
        TokenService::new(&config.jwt_secret, config.jwt_algorithm)
            .context("Failed to initialize token service")?,
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database connection pool initialized");

    let state = AppState::new(
        tokens,
        Arc::new(PgUserRepository::new(db_pool.clone())),
        Arc::new(PgImageRepository::new(db_pool)),
    );

    let (host, port) = config.bind_address();
    tracing::info!("Starting ImageShare auth service on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure)
    })
    .bind((host, port))?
    .run()
    .await?;

    tracing::info!("Auth service shut down");
    Ok(())
}
