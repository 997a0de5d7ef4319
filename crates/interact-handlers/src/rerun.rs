//! Rerun Manager (§4.5): `rerun_gen:<genId>[:<pressCount>]`.

use async_trait::async_trait;

use interact_core::keyboard::InlineButton;
use interact_dispatch::grammar::{parse_rerun_remainder, rerun_gen, RERUN_GEN_PREFIX};
use interact_dispatch::transport::MessageRef;
use interact_dispatch::{CallbackHandler, IncomingCallback, InteractionContext, Result};
use interact_execute::rerun::RerunInput;

use crate::common::{fetch_ancestor, resolve_tool_by_display_name};

pub struct RerunHandler;

#[async_trait]
impl CallbackHandler for RerunHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let (generation_id, press_count) = parse_rerun_remainder(remainder);

        let ancestor = fetch_ancestor(ctx, generation_id).await?;
        let tool = resolve_tool_by_display_name(ctx, &ancestor.tool_display_name).await?;

        let preferences = match ctx.data().get_tool_preferences(&event.sender.master_account_id, &tool.tool_id).await {
            Ok(prefs) => prefs,
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch tool preferences for rerun");
                None
            }
        };

        let input = RerunInput {
            ancestor: &ancestor,
            tool: &tool,
            master_account_id: &event.sender.master_account_id,
            preferences,
        };

        interact_execute::rerun::apply(ctx.data(), input).await?;

        let target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };
        let next_count = press_count + 1;
        let next_label = format!("\u{21BB}{next_count}");
        let mut keyboard = event
            .current_keyboard
            .clone()
            .unwrap_or_else(|| crate::delivery::delivery_keyboard(generation_id));
        if let Some((r, c)) = keyboard.find_by_prefix(RERUN_GEN_PREFIX) {
            keyboard.replace_at(r, c, InlineButton::new(next_label, rerun_gen(generation_id, next_count)));
            ctx.transport().edit_keyboard(&target, &keyboard).await.ok();
        } else {
            tracing::warn!(generation_id, "rerun button not found in keyboard to update counter");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rerun_remainder_recovers_press_count() {
        assert_eq!(parse_rerun_remainder("g1:2"), ("g1", 2));
    }
}
