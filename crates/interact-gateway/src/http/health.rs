use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppCore;

/// GET /health — liveness probe, returns which platforms are connected and
/// the in-memory store sizes.
pub async fn health_handler(State(core): State<Arc<AppCore>>) -> Json<Value> {
    let platforms: Vec<&str> = core
        .transports
        .iter()
        .map(|entry| entry.key().as_str())
        .collect();

    Json(json!({
        "status": "ok",
        "platforms": platforms,
        "reply_contexts": core.reply_contexts.len(),
        "tweak_sessions": core.tweak_sessions.len(),
    }))
}
