//! C6 Delivery Card Renderer (§4.6): the post-generation message with the
//! standard rating+action keyboard, plus `restore_delivery`.

use async_trait::async_trait;

use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::outbound::{OutgoingMedia, OutgoingMessage};
use interact_core::safety::{escape, SafeText};
use interact_core::types::{GenerationRecord, ResponseData};

use interact_dispatch::grammar::{
    rate_gen, restore_delivery, rerun_gen, tweak_gen, view_gen_info, HIDE_MENU,
};
use interact_dispatch::transport::MessageRef;
use interact_dispatch::{CallbackHandler, IncomingCallback, InteractionContext, Result};

use crate::common::fetch_ancestor;

/// Build the standard post-generation message (§4.6): primary media (or
/// text body) plus the two-row rating/action keyboard.
pub fn build_delivery_card(record: &GenerationRecord) -> OutgoingMessage {
    let media = match record.primary_response() {
        Some(ResponseData::Images { images }) => images
            .first()
            .map(|m| OutgoingMedia::Photo { url: m.url.clone() })
            .unwrap_or(OutgoingMedia::Text),
        Some(ResponseData::Animations { animations }) => animations
            .first()
            .map(|m| OutgoingMedia::Animation { url: m.url.clone() })
            .unwrap_or(OutgoingMedia::Text),
        Some(ResponseData::Videos { videos }) => videos
            .first()
            .map(|m| OutgoingMedia::Video { url: m.url.clone() })
            .unwrap_or(OutgoingMedia::Text),
        _ => OutgoingMedia::Text,
    };

    let body = match record.primary_response() {
        Some(ResponseData::Text { text }) => escape(text),
        _ => escape(&record.tool_display_name),
    };

    OutgoingMessage {
        media,
        body,
        keyboard: delivery_keyboard(&record.id),
    }
}

/// Base keyboard: rating row + hide/info/tweak/rerun row, all counters at
/// their bare (no-suffix) starting state (§4.6).
pub fn delivery_keyboard(generation_id: &str) -> InlineKeyboard {
    InlineKeyboard::new()
        .row(vec![
            InlineButton::new("\u{1F63B}", rate_gen(generation_id, "beautiful")),
            InlineButton::new("\u{1F639}", rate_gen(generation_id, "funny")),
            InlineButton::new("\u{1F63F}", rate_gen(generation_id, "negative")),
        ])
        .row(vec![
            InlineButton::new("Hide", HIDE_MENU.to_string()),
            InlineButton::new("Info", view_gen_info(generation_id)),
            InlineButton::new("\u{270E}", tweak_gen(generation_id)),
            InlineButton::new("\u{21BB}", rerun_gen(generation_id, 0)),
        ])
}

/// The `restore_delivery:<genId>` action (§4.6): rebuild exactly the
/// delivery card for `record`. The caller deletes the current message and
/// sends this fresh, replying to the original command (§4.4, §4.6).
pub fn restore_delivery_card(record: &GenerationRecord) -> OutgoingMessage {
    build_delivery_card(record)
}

/// `restore_delivery:<genId>` callback-data builder, re-exported here so
/// callers of this module don't need a second import of `grammar` just for
/// the one string this module is responsible for producing.
pub fn restore_delivery_callback_data(generation_id: &str) -> String {
    restore_delivery(generation_id)
}

/// Increment a `✎`/`↻`-style counter button label: `✎` → `✎1` → `✎2` … (§4.4
/// step 4, §4.5).
pub fn increment_counter_label(base_symbol: &str, current_label: &str) -> String {
    let count: u32 = current_label
        .strip_prefix(base_symbol)
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(0);
    format!("{base_symbol}{}", count + 1)
}

pub fn ephemeral_acknowledgement(text: impl Into<String>) -> SafeText {
    escape(&text.into())
}

/// `restore_delivery:<genId>` (§4.6): delete whatever view is currently
/// showing (info view, spell step, …) and send a fresh delivery card as a
/// reply to the original command.
pub struct RestoreDeliveryHandler;

#[async_trait]
impl CallbackHandler for RestoreDeliveryHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let record = fetch_ancestor(ctx, remainder).await?;
        let card = restore_delivery_card(&record);

        let target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };
        ctx.transport().delete(&target).await.ok();
        ctx.transport().send(&event.chat_id, None, &card).await.ok();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_core::types::{
        DeliveryStatus, GenerationMetadata, GenerationStatus, MediaUrl, ResponsePayloadEntry,
    };
    use std::collections::HashMap;

    fn sample_record() -> GenerationRecord {
        GenerationRecord {
            id: "g1".to_string(),
            tool_id: "img-quick".to_string(),
            tool_display_name: "Quick Image".to_string(),
            service_name: "svc".to_string(),
            request_payload: HashMap::new(),
            response_payload: vec![ResponsePayloadEntry {
                data: ResponseData::Images {
                    images: vec![MediaUrl {
                        url: "https://cdn.example.com/a.png".to_string(),
                    }],
                },
            }],
            status: GenerationStatus::Completed,
            delivery_status: DeliveryStatus::Pending,
            source_platform: "telegram".to_string(),
            ratings: HashMap::new(),
            metadata: GenerationMetadata::default(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn delivery_card_uses_primary_image_as_media() {
        let card = build_delivery_card(&sample_record());
        assert!(matches!(card.media, OutgoingMedia::Photo { .. }));
    }

    #[test]
    fn delivery_keyboard_has_two_rows_with_expected_shape() {
        let kb = delivery_keyboard("g1");
        assert_eq!(kb.rows().len(), 2);
        assert_eq!(kb.rows()[0].len(), 3);
        assert_eq!(kb.rows()[1].len(), 4);
    }

    #[test]
    fn restore_delivery_is_idempotent_for_unchanged_record() {
        let record = sample_record();
        let a = build_delivery_card(&record);
        let b = restore_delivery_card(&record);
        assert_eq!(a.body, b.body);
        assert_eq!(a.keyboard, b.keyboard);
    }

    #[test]
    fn increment_counter_label_sequence() {
        assert_eq!(increment_counter_label("\u{270E}", "\u{270E}"), "\u{270E}1");
        assert_eq!(increment_counter_label("\u{270E}", "\u{270E}1"), "\u{270E}2");
    }
}
