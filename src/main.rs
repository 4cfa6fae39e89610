// src/main.rs

use std::{error::Error, sync::Arc, time::Duration};

use posts_backend::{
    config::Config,
    models::user::Role,
    repositories::{MemoryStore, PgStore},
    routes,
    services::UsersService,
    state::AppState,
    utils::{
        id::{IdGenerator, UuidGenerator},
        jwt::{JwtTokenManager, TokenManager},
    },
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load configuration from environment (.env included)
    let config = Config::from_env()?;

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

    let tokens: Arc<dyn TokenManager> = Arc::new(JwtTokenManager::new(
        &config.jwt_secret,
        config.jwt_expiration,
    ));
    let ids: Arc<dyn IdGenerator> = Arc::new(UuidGenerator);

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = connect_with_retry(database_url).await?;

            // Run Migrations Automatically
            tracing::info!("Running migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied successfully.");

            AppState::new(Arc::new(PgStore::new(pool)), tokens, ids, config.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store. Data is lost on exit.");
            AppState::new(Arc::new(MemoryStore::new()), tokens, ids, config.clone())
        }
    };

    // Seed Admin User
    if let Err(e) = seed_admin_user(&state.users, &config).await {
        tracing::error!("Failed to seed admin user: {}", e);
    }

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    tracing::info!("Listening on {}", config.server_addr);

    // Start the server
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize Database Pool with Retry
async fn connect_with_retry(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut retry_count = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("Database connected...");
                return Ok(pool);
            }
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to connect to database after 5 retries: {}", e);
                    return Err(e);
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

async fn seed_admin_user(users: &UsersService, config: &Config) -> Result<(), Box<dyn Error>> {
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        match users.register("Admin", email, password, Role::Admin).await {
            Ok(_) => tracing::info!("Admin user created successfully."),
            Err(posts_backend::error::AppError::BadRequest(_)) => {
                tracing::debug!("Admin user {} already present.", email)
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
