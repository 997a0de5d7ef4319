//! `view_gen_info:<genId>` / `view_spell_step:<genId>:<idx>` (§4.6 spell
//! rendering, §4.7 info viewer).

use async_trait::async_trait;

use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::outbound::OutgoingMessage;
use interact_core::safety::{escape, SafeText};
use interact_core::types::{GenerationRecord, ToolDefinition};
use interact_dispatch::grammar::{restore_delivery, view_spell_step};
use interact_dispatch::{CallbackHandler, IncomingCallback, InteractionContext, Result};

use crate::common::{display_value, fetch_ancestor};

/// Render tool display name and every `requestPayload` entry, substituting
/// `userInputPrompt` for the tool's configured prompt-input key when
/// present, and omitting URL-valued fields (§4.6 spell step rendering,
/// §4.7).
pub fn render_generation_body(record: &GenerationRecord, tool: Option<&ToolDefinition>, omit_urls: bool) -> SafeText {
    let prompt_key = tool.and_then(|t| t.metadata.telegram_prompt_input_key.as_deref());

    let mut lines = vec![format!("*{}*", record.tool_display_name)];
    for (key, value) in &record.request_payload {
        if omit_urls {
            if let serde_json::Value::String(s) = value {
                if s.starts_with("http://") || s.starts_with("https://") {
                    continue;
                }
            }
        }
        let rendered = if Some(key.as_str()) == prompt_key {
            record
                .metadata
                .user_input_prompt
                .clone()
                .unwrap_or_else(|| display_value(value))
        } else {
            display_value(value)
        };
        lines.push(format!("{key}: {rendered}"));
    }
    escape(&lines.join("\n"))
}

fn back_to_delivery_keyboard(generation_id: &str) -> InlineKeyboard {
    InlineKeyboard::new().row(vec![InlineButton::new("\u{2B05} Back", restore_delivery(generation_id))])
}

fn spell_step_keyboard(record: &GenerationRecord) -> InlineKeyboard {
    let mut row = Vec::new();
    for (idx, _step_id) in record.metadata.step_generation_ids.iter().enumerate() {
        row.push(InlineButton::new(
            format!("Step {}", idx + 1),
            view_spell_step(&record.id, idx),
        ));
    }
    let mut kb = InlineKeyboard::new();
    for chunk in row.chunks(3) {
        kb = kb.row(chunk.to_vec());
    }
    kb.row(vec![InlineButton::new("\u{2B05} Back", restore_delivery(&record.id))])
}

pub struct ViewGenInfoHandler;

#[async_trait]
impl CallbackHandler for ViewGenInfoHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let generation_id = remainder;
        let record = fetch_ancestor(ctx, generation_id).await?;
        let tool = ctx
            .tools()
            .by_display_name(ctx.data(), &record.tool_display_name)
            .await
            .ok()
            .flatten();

        let keyboard = if record.metadata.is_spell {
            spell_step_keyboard(&record)
        } else {
            back_to_delivery_keyboard(&record.id)
        };
        let message = OutgoingMessage::text(render_generation_body(&record, tool.as_ref(), false), keyboard);

        // The delivery card may be a photo/animation/video; editing media in
        // place to plain text isn't supported by either transport, so the
        // current message is deleted and the info view sent fresh (§4.9
        // "the photo is deleted first").
        let target = interact_dispatch::transport::MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };
        ctx.transport().delete(&target).await.ok();
        ctx.transport().send(&event.chat_id, None, &message).await.ok();

        Ok(())
    }
}

pub struct ViewSpellStepHandler;

#[async_trait]
impl CallbackHandler for ViewSpellStepHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let (generation_id, idx_raw) = remainder
            .split_once(':')
            .ok_or_else(|| interact_dispatch::DispatchError::Validation("malformed view_spell_step callback".to_string()))?;
        let idx: usize = idx_raw
            .parse()
            .map_err(|_| interact_dispatch::DispatchError::Validation("malformed step index".to_string()))?;

        let parent = fetch_ancestor(ctx, generation_id).await?;
        let step_id = parent
            .metadata
            .step_generation_ids
            .get(idx)
            .ok_or(interact_dispatch::DispatchError::AncestorMissing)?;
        let step = fetch_ancestor(ctx, step_id).await?;
        let tool = ctx
            .tools()
            .by_display_name(ctx.data(), &step.tool_display_name)
            .await
            .ok()
            .flatten();

        let keyboard = InlineKeyboard::new().row(vec![InlineButton::new(
            "\u{2B05} Back",
            interact_dispatch::grammar::view_gen_info(generation_id),
        )]);
        let message = OutgoingMessage::text(render_generation_body(&step, tool.as_ref(), true), keyboard);

        let target = interact_dispatch::transport::MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };
        ctx.transport().edit(&target, &message).await.ok();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_core::types::{
        DeliveryStatus, GenerationMetadata, GenerationStatus,
    };
    use std::collections::HashMap;

    fn sample_record() -> GenerationRecord {
        let mut request_payload = HashMap::new();
        request_payload.insert("input_prompt".to_string(), serde_json::json!("a cat"));
        request_payload.insert(
            "input_image_url".to_string(),
            serde_json::json!("https://cdn.example.com/src.png"),
        );
        GenerationRecord {
            id: "g1".to_string(),
            tool_id: "img-quick".to_string(),
            tool_display_name: "Quick Image".to_string(),
            service_name: "svc".to_string(),
            request_payload,
            response_payload: Vec::new(),
            status: GenerationStatus::Completed,
            delivery_status: DeliveryStatus::Delivered,
            source_platform: "telegram".to_string(),
            ratings: HashMap::new(),
            metadata: GenerationMetadata::default(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn render_generation_body_omits_urls_when_requested() {
        let record = sample_record();
        let body = render_generation_body(&record, None, true);
        assert!(!body.as_str().contains("cdn\\.example\\.com"));
        assert!(body.as_str().contains("input_prompt"));
    }

    #[test]
    fn render_generation_body_keeps_urls_by_default() {
        let record = sample_record();
        let body = render_generation_body(&record, None, false);
        assert!(body.as_str().contains("input_image_url"));
    }
}
