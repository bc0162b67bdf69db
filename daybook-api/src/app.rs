/// Router assembly
///
/// [`AppState`] carries the pool, the loaded configuration and the webhook
/// client into every handler; [`build_router`] wires the routes to it.
///
/// # Example
///
/// ```no_run
/// use daybook_api::{app::AppState, config::Config};
/// use daybook_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.pool_config()).await?;
/// let state = AppState::new(pool, config)?;
/// let app = daybook_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use daybook_shared::webhook::WebhookClient;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Handler state, cloned per request by the `State` extractor
#[derive(Clone)]
pub struct AppState {
    /// SQLite pool shared by every handler
    pub db: SqlitePool,

    pub config: Arc<Config>,

    /// Outbound webhook client
    pub webhook: WebhookClient,
}

impl AppState {
    /// # Errors
    ///
    /// Fails if the webhook HTTP client cannot be built.
    pub fn new(db: SqlitePool, config: Config) -> anyhow::Result<Self> {
        let webhook = WebhookClient::new(config.webhook.url.clone(), config.webhook.timeout())?;

        Ok(Self {
            db,
            config: Arc::new(config),
            webhook,
        })
    }
}

/// Builds the router for the whole service
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /                          # Welcome text
/// ├── GET /music                     # Fixed sample data
/// ├── GET /calendar                  # Fixed sample data
/// ├── GET /tasks                     # Fixed sample data
/// ├── GET /api/trigger-n8n           # Fire the outbound webhook
/// ├── GET /health                    # Health check
/// └── /v1/
///     ├── POST   /users
///     ├── GET    /users/:id
///     ├── DELETE /users/:id          # Cascades to everything the user owns
///     ├── GET|POST /users/:id/calendar-events
///     ├── GET|POST /users/:id/playlists
///     ├── GET|POST /users/:id/tasks
///     ├── GET    /playlists/:id      # Playlist with its tracks
///     ├── GET|POST /playlists/:id/tracks
///     └── PATCH  /tasks/:id
/// ```
///
/// Requests pass the CORS layer first, then the trace layer.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::showcase::welcome))
        .route("/music", get(routes::showcase::music))
        .route("/calendar", get(routes::showcase::calendar))
        .route("/tasks", get(routes::showcase::tasks))
        .route("/api/trigger-n8n", get(routes::webhook::trigger_n8n))
        .route("/health", get(routes::health::health_check));

    let v1_routes = Router::new()
        .route("/users", post(routes::users::create_user))
        .route(
            "/users/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .route(
            "/users/:id/calendar-events",
            get(routes::calendar::list_events).post(routes::calendar::create_event),
        )
        .route(
            "/users/:id/playlists",
            get(routes::music::list_playlists).post(routes::music::create_playlist),
        )
        .route("/playlists/:id", get(routes::music::get_playlist))
        .route(
            "/playlists/:id/tracks",
            get(routes::music::list_tracks).post(routes::music::add_track),
        )
        .route(
            "/users/:id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/:id", patch(routes::tasks::update_task));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
