//! Local Library Server
//!
//! `locallibrary-server` runs the HTTP server;
//! `locallibrary-server hash-password <password>` prints an argon2 hash
//! for provisioning user rows.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locallibrary_server::{
    api,
    config::{AppConfig, SessionBackend},
    repository::Repository,
    services::{
        redis::RedisService,
        session::{MemorySessionStore, SessionStore},
        users::hash_password,
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        return match (command.as_str(), args.next()) {
            ("hash-password", Some(password)) => {
                println!("{}", hash_password(&password)?);
                Ok(())
            }
            _ => anyhow::bail!("usage: locallibrary-server [hash-password <password>]"),
        };
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("locallibrary_server={},tower_http=debug", config.logging.level).into()
    });
    let json = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().pretty()))
        .init();

    tracing::info!("Starting Local Library Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    // Session values
    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let redis = RedisService::new(&config.redis.url, config.session.ttl_seconds)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis");
            Arc::new(redis)
        }
        SessionBackend::Memory => {
            tracing::warn!("Using in-memory session store; visit counters reset on restart");
            Arc::new(MemorySessionStore::new())
        }
    };

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config, sessions);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
