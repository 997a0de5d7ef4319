//! Settings & Preferences Menu (§4.3): a single message, always edited or
//! rebuilt in place, driving per-tool parameter preferences.

use async_trait::async_trait;

use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::outbound::OutgoingMessage;
use interact_core::paramvalue::parse as parse_param_value;
use interact_core::safety::escape;
use interact_core::types::ToolDefinition;
use interact_dispatch::grammar::{parse_settings_action, set_all_tools, set_close, set_edit_param, set_main, set_tool_params, SettingsAction};
use interact_dispatch::transport::MessageRef;
use interact_dispatch::{CallbackHandler, DispatchError, IncomingCallback, IncomingReply, InteractionContext, ReplyHandler, Result};
use interact_state::ReplyContext;

use crate::common::truncate_with_ellipsis;

/// Most-frequent tools are fetched at 3x the display limit so that tool ids
/// which no longer exist in the registry can be filtered out without
/// falling short of the 4-tool display (§4.3).
const MAIN_DISPLAY_LIMIT: u32 = 4;
const MAIN_FETCH_MULTIPLIER: u32 = 3;
const ALL_TOOLS_PAGE_SIZE: usize = 6;

pub(crate) async fn render_main(ctx: &dyn InteractionContext, master_account_id: &str) -> Result<OutgoingMessage> {
    let frequent = ctx
        .data()
        .most_frequent_tools(master_account_id, MAIN_DISPLAY_LIMIT * MAIN_FETCH_MULTIPLIER)
        .await?;

    let mut buttons = Vec::new();
    for entry in frequent {
        if buttons.len() >= MAIN_DISPLAY_LIMIT as usize {
            break;
        }
        if ctx.tools().by_id(ctx.data(), &entry.tool_id).await?.is_some() {
            buttons.push(InlineButton::new(entry.display_name.clone(), set_tool_params(&entry.display_name)));
        }
    }

    let mut keyboard = InlineKeyboard::new();
    for chunk in buttons.chunks(1) {
        keyboard = keyboard.row(chunk.to_vec());
    }
    keyboard = keyboard.row(vec![InlineButton::new("All Tools", set_all_tools(0))]);
    keyboard = keyboard.row(vec![InlineButton::new("Close", set_close())]);

    Ok(OutgoingMessage::text(escape("Settings"), keyboard))
}

async fn render_tool_params(ctx: &dyn InteractionContext, master_account_id: &str, tool: &ToolDefinition) -> Result<OutgoingMessage> {
    let prefs = ctx
        .data()
        .get_tool_preferences(master_account_id, &tool.tool_id)
        .await?
        .unwrap_or_default();

    let mut param_names: Vec<&String> = tool.input_schema.keys().collect();
    param_names.sort();

    let mut keyboard = InlineKeyboard::new();
    for name in param_names {
        let schema = &tool.input_schema[name];
        let current = prefs
            .get(name)
            .or(schema.default.as_ref())
            .map(crate::common::display_value)
            .unwrap_or_else(|| "Not set".to_string());
        let label = truncate_with_ellipsis(&format!("{name}: {current}"), 12);
        keyboard = keyboard.row(vec![InlineButton::new(label, set_edit_param(&tool.display_name, name))]);
    }
    keyboard = keyboard.row(vec![InlineButton::new("\u{2B05} Back", set_main())]);

    Ok(OutgoingMessage::text(escape(&tool.display_name), keyboard))
}

fn render_all_tools(mut tools: Vec<ToolDefinition>, page: u32) -> OutgoingMessage {
    tools.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    let start = page as usize * ALL_TOOLS_PAGE_SIZE;
    let page_tools: Vec<_> = tools.iter().skip(start).take(ALL_TOOLS_PAGE_SIZE).collect();

    let mut keyboard = InlineKeyboard::new();
    for pair in page_tools.chunks(2) {
        let row = pair
            .iter()
            .map(|t| InlineButton::new(t.display_name.clone(), set_tool_params(&t.display_name)))
            .collect();
        keyboard = keyboard.row(row);
    }

    let mut nav = Vec::new();
    if page > 0 {
        nav.push(InlineButton::new("\u{25C0} Prev", set_all_tools(page - 1)));
    }
    if start + ALL_TOOLS_PAGE_SIZE < tools.len() {
        nav.push(InlineButton::new("Next \u{25B6}", set_all_tools(page + 1)));
    }
    if !nav.is_empty() {
        keyboard = keyboard.row(nav);
    }
    keyboard = keyboard.row(vec![InlineButton::new("\u{2B05} Back", set_main())]);

    OutgoingMessage::text(escape("All Tools"), keyboard)
}

pub struct SettingsMenuHandler;

#[async_trait]
impl CallbackHandler for SettingsMenuHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let action = parse_settings_action(remainder)
            .ok_or_else(|| DispatchError::Validation("malformed settings callback".to_string()))?;

        let target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };

        match action {
            SettingsAction::Main => {
                let message = render_main(ctx, &event.sender.master_account_id).await?;
                ctx.transport().edit(&target, &message).await.ok();
            }
            SettingsAction::Close => {
                ctx.transport().delete(&target).await.ok();
            }
            SettingsAction::AllTools { page } => {
                let tools = ctx.tools().all(ctx.data()).await?;
                ctx.transport().edit(&target, &render_all_tools(tools, page)).await.ok();
            }
            SettingsAction::ToolParams { display_name } => {
                let tool = crate::common::resolve_tool_by_display_name(ctx, &display_name).await?;
                let message = render_tool_params(ctx, &event.sender.master_account_id, &tool).await?;
                ctx.transport().edit(&target, &message).await.ok();
            }
            SettingsAction::EditParam { display_name, param_name } => {
                let tool = crate::common::resolve_tool_by_display_name(ctx, &display_name).await?;
                let prompt = OutgoingMessage::text(
                    escape(&format!("Reply with the new value for {param_name}.")),
                    InlineKeyboard::new(),
                );
                let sent = ctx
                    .transport()
                    .send(&event.chat_id, None, &prompt)
                    .await
                    .map_err(|_| DispatchError::Validation("couldn't send parameter prompt".to_string()))?;
                ctx.reply_contexts().put(
                    &sent.chat_id,
                    &sent.message_id,
                    ReplyContext::SettingsParamEdit {
                        tool_id: tool.tool_id.clone(),
                        param_name,
                        menu_chat_id: event.chat_id.clone(),
                        menu_msg_id: event.message_id.clone(),
                    },
                );
            }
        }

        Ok(())
    }
}

pub struct SettingsParamEditReplyHandler;

#[async_trait]
impl ReplyHandler for SettingsParamEditReplyHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingReply, reply_context: ReplyContext) -> Result<()> {
        let (tool_id, param_name, menu_chat_id, menu_msg_id) = match reply_context {
            ReplyContext::SettingsParamEdit {
                tool_id,
                param_name,
                menu_chat_id,
                menu_msg_id,
            } => (tool_id, param_name, menu_chat_id, menu_msg_id),
            _ => return Err(DispatchError::ContextLoss),
        };

        let tool = ctx
            .tools()
            .by_id(ctx.data(), &tool_id)
            .await?
            .ok_or(DispatchError::AncestorMissing)?;
        let schema = tool
            .input_schema
            .get(&param_name)
            .ok_or_else(|| DispatchError::Validation(format!("unknown parameter {param_name:?}")))?;

        let parsed = match parse_param_value(&event.text, schema.param_type) {
            Ok(v) => v,
            Err(e) => {
                let prompt = OutgoingMessage::text(escape(&e.0), InlineKeyboard::new());
                ctx.transport().send(&event.chat_id, Some(&event.message_id), &prompt).await.ok();
                return Ok(());
            }
        };

        ctx.data()
            .set_tool_preference(&event.sender.master_account_id, &tool_id, &param_name, &parsed.into_json())
            .await?;

        let reply_target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };
        let prompt_target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.replied_to_message_id.clone(),
        };
        ctx.transport().delete(&reply_target).await.ok();
        ctx.transport().delete(&prompt_target).await.ok();

        let menu_target = MessageRef {
            chat_id: menu_chat_id,
            message_id: menu_msg_id,
        };
        let message = render_tool_params(ctx, &event.sender.master_account_id, &tool).await?;
        ctx.transport().edit(&menu_target, &message).await.ok();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tools_pagination_produces_three_rows_for_six_items() {
        let tools: Vec<ToolDefinition> = (0..6)
            .map(|i| ToolDefinition {
                tool_id: format!("t{i}"),
                display_name: format!("Tool {i}"),
                description: None,
                input_schema: Default::default(),
                metadata: Default::default(),
                delivery_mode: interact_core::types::DeliveryMode::Immediate,
            })
            .collect();
        let message = render_all_tools(tools, 0);
        // 3 rows of 2 tools each, plus the trailing "Back" row (no nav row
        // needed since all 6 tools fit on page 0).
        assert_eq!(message.keyboard.rows().len(), 4);
    }
}
