//! Generation-complete notification ingress — POST /notify/generation-complete.
//!
//! The execution service (external collaborator, §1) calls back here once a
//! generation finishes, so the core can render and send the delivery card
//! (C6) even though the triggering button press may have happened long
//! before the job actually completed (§2 flow: "external notifier later
//! invokes C6 to deliver result").

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use interact_core::types::Platform;
use interact_handlers::delivery::build_delivery_card;

use crate::app::AppCore;

#[derive(Deserialize)]
pub struct NotifyRequest {
    pub generation_id: String,
}

/// POST /notify/generation-complete — fetch the now-completed generation,
/// build its delivery card, and send it to whichever chat/thread the
/// ancestor command originated from.
pub async fn generation_complete_handler(
    State(core): State<Arc<AppCore>>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let envelope = core.data.get_generation(&req.generation_id).await.map_err(|e| {
        warn!(generation_id = %req.generation_id, error = %e, "notify: generation not found");
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "generation not found"})),
        )
    })?;
    let record = envelope.record;

    let Some(platform) = Platform::parse(&record.source_platform) else {
        warn!(platform = %record.source_platform, "notify: unknown source platform, dropping");
        return Ok(Json(json!({"ok": false, "reason": "unknown platform"})));
    };

    let Some(transport) = core.transports.get(&platform).map(|e| e.value().clone()) else {
        warn!(%platform, "notify: no transport connected for this platform");
        return Ok(Json(json!({"ok": false, "reason": "platform not connected"})));
    };

    let chat_id = record
        .metadata
        .notification_context
        .chat_id
        .clone()
        .or_else(|| record.metadata.platform_context.chat_id.clone());
    let Some(chat_id) = chat_id else {
        warn!(generation_id = %record.id, "notify: no delivery chat recorded for this generation");
        return Ok(Json(json!({"ok": false, "reason": "no notification context"})));
    };
    let reply_to = record
        .metadata
        .notification_context
        .reply_to_message_id
        .clone()
        .or_else(|| record.metadata.notification_context.message_id.clone());

    let card = build_delivery_card(&record);
    match transport.send(&chat_id, reply_to.as_deref(), &card).await {
        Ok(_) => {
            info!(generation_id = %record.id, %platform, "delivery card sent");
            if let Err(e) = core
                .data
                .patch_generation(&record.id, json!({"deliveryStatus": "delivered"}))
                .await
            {
                warn!(generation_id = %record.id, error = %e, "failed to mark generation delivered");
            }
            Ok(Json(json!({"ok": true})))
        }
        Err(e) => {
            error!(generation_id = %record.id, %platform, error = %e, "failed to send delivery card");
            Ok(Json(json!({"ok": false, "reason": "send failed"})))
        }
    }
}
