//! LoRA Browser (§4.9): categorical × checkpoint-filter × page browser
//! with a two-round-trip favorite toggle (slug resolved to `_id`, then the
//! favorite endpoint is called with that id).

use async_trait::async_trait;

use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::outbound::OutgoingMessage;
use interact_core::safety::escape;
use interact_data::types::LoraSummary;
use interact_dispatch::grammar::{lora_category, lora_favorite, lora_view, parse_lora_action, LoraAction, HIDE_MENU};
use interact_dispatch::transport::MessageRef;
use interact_dispatch::{CallbackHandler, DispatchError, IncomingCallback, InteractionContext, Result};

const CATEGORIES: &[&str] = &["memes", "character", "style", "popular", "recent", "favorites"];
const CHECKPOINTS: &[&str] = &["All", "SDXL", "SD1.5", "FLUX"];
const PAGE_SIZE: usize = 6;

/// The detail view has no stable path back to wherever the user was
/// browsing, since `lora:view:<slug>` doesn't carry category/checkpoint/page
/// state; "Back" returns to this default landing page rather than growing
/// the callback payload to carry full browse state (documented in DESIGN.md).
const HOME_CATEGORY: &str = "popular";
const HOME_CHECKPOINT: &str = "All";

pub(crate) fn render_category_list(mut loras: Vec<LoraSummary>, category: &str, checkpoint: &str, page: u32) -> OutgoingMessage {
    if checkpoint != "All" {
        loras.retain(|l| l.checkpoint == checkpoint);
    }
    loras.sort_by(|a, b| a.name.cmp(&b.name));

    let start = page as usize * PAGE_SIZE;
    let page_loras: Vec<_> = loras.iter().skip(start).take(PAGE_SIZE).collect();

    let mut keyboard = InlineKeyboard::new();
    for pair in page_loras.chunks(2) {
        let row = pair
            .iter()
            .map(|l| InlineButton::new(l.name.clone(), lora_view(&l.slug)))
            .collect();
        keyboard = keyboard.row(row);
    }

    let mut nav = Vec::new();
    if page > 0 {
        nav.push(InlineButton::new("\u{25C0} Prev", lora_category(category, checkpoint, page - 1)));
    }
    if start + PAGE_SIZE < loras.len() {
        nav.push(InlineButton::new("Next \u{25B6}", lora_category(category, checkpoint, page + 1)));
    }
    if !nav.is_empty() {
        keyboard = keyboard.row(nav);
    }

    let checkpoint_row = CHECKPOINTS
        .iter()
        .map(|cp| InlineButton::new(*cp, lora_category(category, cp, 0)))
        .collect();
    keyboard = keyboard.row(checkpoint_row);

    let category_row = CATEGORIES
        .iter()
        .map(|c| InlineButton::new(*c, lora_category(c, checkpoint, 0)))
        .collect();
    keyboard = keyboard.row(category_row);
    keyboard = keyboard.row(vec![InlineButton::new("Close", HIDE_MENU.to_string())]);

    OutgoingMessage::text(escape(&format!("LoRAs: {category} ({checkpoint})")), keyboard)
}

fn render_detail(detail: &interact_data::types::LoraDetail) -> OutgoingMessage {
    let mut lines = vec![format!("*{}*", detail.name)];
    if let Some(desc) = &detail.description {
        lines.push(desc.clone());
    }
    lines.push(format!("Category: {}", detail.category));
    lines.push(format!("Checkpoint: {}", detail.checkpoint));

    let fav_label = if detail.favorited { "\u{2605} Unfavorite" } else { "\u{2606} Favorite" };
    let keyboard = InlineKeyboard::new()
        .row(vec![InlineButton::new(fav_label, lora_favorite(&detail.slug, !detail.favorited))])
        .row(vec![InlineButton::new(
            "\u{2B05} Back",
            lora_category(HOME_CATEGORY, HOME_CHECKPOINT, 0),
        )]);

    OutgoingMessage::text(escape(&lines.join("\n")), keyboard)
}

pub struct LoraBrowserHandler;

#[async_trait]
impl CallbackHandler for LoraBrowserHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let action = parse_lora_action(remainder)
            .ok_or_else(|| DispatchError::Validation("malformed lora callback".to_string()))?;

        let target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };

        match action {
            LoraAction::Category { category, checkpoint, page } => {
                let loras = ctx.data().list_loras(Some(&category)).await?;
                let message = render_category_list(loras, &category, &checkpoint, page);
                ctx.transport().edit(&target, &message).await.ok();
            }
            LoraAction::View { slug } => {
                let detail = ctx.data().get_lora(&slug).await?;
                let message = render_detail(&detail);
                ctx.transport().delete(&target).await.ok();
                ctx.transport().send(&event.chat_id, None, &message).await.ok();
            }
            LoraAction::Favorite { slug, on } => {
                let detail = ctx.data().get_lora(&slug).await?;
                ctx.data().set_lora_favorite(&event.sender.master_account_id, &detail.id, on).await?;
                let refreshed = ctx.data().get_lora(&slug).await?;
                let message = render_detail(&refreshed);
                ctx.transport().delete(&target).await.ok();
                ctx.transport().send(&event.chat_id, None, &message).await.ok();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_loras() -> Vec<LoraSummary> {
        (0..5)
            .map(|i| LoraSummary {
                id: format!("id{i}"),
                slug: format!("slug-{i}"),
                name: format!("Lora {i}"),
                category: "popular".to_string(),
                checkpoint: if i % 2 == 0 { "SDXL".to_string() } else { "FLUX".to_string() },
            })
            .collect()
    }

    #[test]
    fn category_list_filters_by_checkpoint() {
        let message = render_category_list(sample_loras(), "popular", "SDXL", 0);
        let total_buttons: usize = message.keyboard.rows().iter().take(2).map(|r| r.len()).sum();
        // 3 SDXL entries (indices 0,2,4) -> 2 rows (2 + 1)
        assert_eq!(total_buttons, 3);
    }

    #[test]
    fn category_list_unfiltered_shows_all() {
        let message = render_category_list(sample_loras(), "popular", "All", 0);
        let total_buttons: usize = message.keyboard.rows().iter().take(3).map(|r| r.len()).sum();
        assert_eq!(total_buttons, 5);
    }
}
