//! # Daybook API Server
//!
//! Serves the Daybook data model over HTTP.
//!
//! ## Startup
//!
//! 1. Initialise tracing (`RUST_LOG` overrides the default filter)
//! 2. Load configuration from the environment and `.env`
//! 3. Open the SQLite pool and create any missing tables and indexes
//! 4. Serve until Ctrl-C, then close the pool
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=sqlite://daybook.db cargo run -p daybook-api
//! ```

use daybook_api::{
    app::{build_router, AppState},
    config::Config,
};
use daybook_shared::db::{
    pool::{close_pool, create_pool},
    schema::apply_schema,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "daybook_api=debug,daybook_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Daybook API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(config.database.pool_config()).await?;
    apply_schema(&pool).await?;

    if config.webhook.url.is_none() {
        tracing::warn!("WEBHOOK_URL is not set; /api/trigger-n8n will answer 503");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, exiting...");
}
