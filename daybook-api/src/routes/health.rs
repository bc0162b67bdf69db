/// Health check endpoint
///
/// Reports whether the server is up and whether the database answers.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "schema": "up_to_date"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use daybook_shared::db::{pool::health_check as db_health_check, schema::schema_status};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status ("healthy" or "degraded")
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Schema status ("up_to_date", "incomplete" or "unknown")
    pub schema: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match db_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    let schema = if connected {
        match schema_status(&state.db).await {
            Ok(status) if status.is_up_to_date() => "up_to_date",
            Ok(status) => {
                warn!(missing = ?status.tables_missing, "Schema incomplete");
                "incomplete"
            }
            Err(_) => "unknown",
        }
    } else {
        "unknown"
    };

    let healthy = connected && schema == "up_to_date";

    Ok(Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        schema: schema.to_string(),
    }))
}
