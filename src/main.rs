use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use menu_api::auth::JwtAuthenticator;
use menu_api::config::AppConfig;
use menu_api::database::{MemoryStore, MenuStore, PgStore};
use menu_api::media::LocalImageStore;
use menu_api::{app, AppState, ServiceOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("menu_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = menu_api::config::config();
    tracing::info!("Starting Menu API in {:?} mode", config.environment);

    let store = open_store(config).await?;

    let images = Arc::new(LocalImageStore::new(
        config.media.root.clone(),
        config.media.max_image_bytes,
    ));
    tracing::info!("Storing dish images under {}", images.root().display());

    let auth = JwtAuthenticator::new(
        config.security.jwt_secret.clone(),
        config.security.jwt_expiry_hours,
    )
    .context("JWT_SECRET must be set")?;

    let state = AppState::new(store, images, Arc::new(auth)).with_options(ServiceOptions {
        hide_empty_menus_from_public: config.api.hide_empty_menus_from_public,
    });

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Menu API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Menu API stopped");
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MenuStore>> {
    match config.database.url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url, &config.database)
                .await
                .context("failed to connect to Postgres")?;
            store.migrate().await.context("failed to apply migrations")?;
            Ok(Arc::new(store))
        }
        None if menu_api::is_production!() => {
            anyhow::bail!("DATABASE_URL must be set in production")
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data will not persist");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
