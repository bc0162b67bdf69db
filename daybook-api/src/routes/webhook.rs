/// Outbound webhook trigger
///
/// # Endpoint
///
/// ```text
/// GET /api/trigger-n8n
/// ```
///
/// Posts `{"message": ..., "timestamp": ...}` once to the configured
/// `WEBHOOK_URL` and answers with plain text naming the upstream status:
///
/// ```text
/// n8n Webhook triggered. Response status: 200
/// ```
///
/// An upstream non-2xx status is still reported with 200 here. Failing to
/// reach the upstream at all yields 502; a missing URL yields 503.

use crate::{app::AppState, error::ApiResult};
use axum::extract::State;

pub async fn trigger_n8n(State(state): State<AppState>) -> ApiResult<String> {
    let status = state.webhook.trigger().await?;
    Ok(format!("n8n Webhook triggered. Response status: {}", status))
}
