//! Tweak Manager (§4.4) — the central piece of the core. Five callback
//! handlers plus a reply handler share one `TweakSession` keyed by
//! `(generationId, masterAccountId)` and aliased through a short token.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::outbound::OutgoingMessage;
use interact_core::paramvalue::parse as parse_param_value;
use interact_core::safety::{escape, redact_file_url};
use interact_core::types::ToolDefinition;
use interact_dispatch::grammar::{
    parse_tweak_param_edit_remainder, tweak_apply, tweak_cancel, tweak_gen, tweak_param_edit,
    TWEAK_GEN_PREFIX,
};
use interact_dispatch::transport::MessageRef;
use interact_dispatch::{
    CallbackHandler, DispatchError, IncomingCallback, IncomingReply, InteractionContext,
    ReplyHandler, Result,
};
use interact_state::{session_key, ReplyContext, TweakSession};
use interact_execute::tweak::TweakApplyInput;

use crate::common::{display_value, fetch_ancestor, resolve_tool_by_display_name, truncate_with_ellipsis};
use crate::delivery;

fn render_tweak_menu(tool: &ToolDefinition, session: &TweakSession, token: &str) -> OutgoingMessage {
    let mut names: Vec<&String> = tool.input_schema.keys().collect();
    names.sort();

    let mut keyboard = InlineKeyboard::new();
    for name in names {
        let value = session.params.get(name).cloned().unwrap_or(Value::Null);
        let label = truncate_with_ellipsis(&format!("{name}: {}", display_value(&value)), 12);
        keyboard = keyboard.row(vec![InlineButton::new(label, tweak_param_edit(token, name))]);
    }

    let mut actions = Vec::new();
    if session.dirty {
        actions.push(InlineButton::new("\u{1F680} Send", tweak_apply(token)));
    }
    actions.push(InlineButton::new("Cancel", tweak_cancel(token)));
    keyboard = keyboard.row(actions);

    OutgoingMessage::text(escape(&format!("Tweak: {}", tool.display_name)), keyboard)
}

/// Shared by the open (`tweak_gen:`) and cancel (`tweak_cancel:`) paths:
/// both end up re-initializing a fresh session from the ancestor's
/// defaults, attempting an in-place overlay with a send-as-reply fallback
/// (§4.4 step 1, step 5).
async fn init_session(ctx: &dyn InteractionContext, event: &IncomingCallback, generation_id: &str) -> Result<()> {
    let ancestor = fetch_ancestor(ctx, generation_id).await?;
    let tool = resolve_tool_by_display_name(ctx, &ancestor.tool_display_name).await?;

    let mut params: HashMap<String, Value> = ancestor.request_payload.clone();
    let input_prompt = ancestor
        .metadata
        .user_input_prompt
        .clone()
        .or_else(|| params.get("input_prompt").and_then(|v| v.as_str()).map(str::to_string));
    if let Some(prompt) = input_prompt {
        params.insert("input_prompt".to_string(), Value::String(prompt));
    }

    let key = session_key(generation_id, &event.sender.master_account_id);
    let current_keyboard = event
        .current_keyboard
        .clone()
        .unwrap_or_else(|| delivery::delivery_keyboard(generation_id));
    let orig_keyboard = serde_json::to_string(&current_keyboard).ok();

    let mut session = TweakSession {
        generation_id: generation_id.to_string(),
        master_account_id: event.sender.master_account_id.clone(),
        canonical_tool_id: tool.tool_id.clone(),
        tool_display_name: tool.display_name.clone(),
        params,
        menu_chat_id: event.chat_id.clone(),
        menu_msg_id: event.message_id.clone(),
        orig_keyboard,
        is_new_menu: false,
        dirty: false,
    };

    let token = ctx.tweak_tokens().token_for(&key);
    let message = render_tweak_menu(&tool, &session, &token);
    let target = MessageRef {
        chat_id: event.chat_id.clone(),
        message_id: event.message_id.clone(),
    };

    if ctx.transport().edit(&target, &message).await.is_err() {
        let sent = ctx
            .transport()
            .send(&event.chat_id, Some(&event.message_id), &message)
            .await
            .map_err(|_| DispatchError::Validation("couldn't open the tweak menu".to_string()))?;
        session.menu_chat_id = sent.chat_id;
        session.menu_msg_id = sent.message_id;
        session.is_new_menu = true;
    }

    ctx.tweak_sessions().create(key, session);
    Ok(())
}

pub struct TweakOpenHandler;

#[async_trait]
impl CallbackHandler for TweakOpenHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        init_session(ctx, event, remainder).await
    }
}

pub struct TweakCancelHandler;

#[async_trait]
impl CallbackHandler for TweakCancelHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let session_key = ctx.tweak_tokens().resolve(remainder).map_err(|_| DispatchError::SessionLoss)?;
        let session = ctx.tweak_sessions().get(&session_key).map_err(|_| DispatchError::SessionLoss)?;
        ctx.tweak_sessions().destroy(&session_key);
        ctx.tweak_tokens().remove_by_key(&session_key);
        init_session(ctx, event, &session.generation_id).await
    }
}

pub struct TweakParamEditHandler;

#[async_trait]
impl CallbackHandler for TweakParamEditHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let (token, param_name) = parse_tweak_param_edit_remainder(remainder)
            .ok_or_else(|| DispatchError::Validation("malformed tweak param-edit callback".to_string()))?;

        let session_key = ctx.tweak_tokens().resolve(token).map_err(|_| DispatchError::SessionLoss)?;
        let session = ctx.tweak_sessions().get(&session_key).map_err(|_| DispatchError::SessionLoss)?;

        let current = session
            .params
            .get(param_name)
            .map(display_value)
            .unwrap_or_else(|| "Not set".to_string());
        let current = redact_file_url(&current);

        let prompt = OutgoingMessage::text(
            escape(&format!("Current value: `{current}`\nReply with the new value.")),
            InlineKeyboard::new(),
        );
        let sent = ctx
            .transport()
            .send(&event.chat_id, None, &prompt)
            .await
            .map_err(|_| DispatchError::Validation("couldn't send the parameter prompt".to_string()))?;

        ctx.reply_contexts().put(
            &sent.chat_id,
            &sent.message_id,
            ReplyContext::TweakParamEdit {
                token: token.to_string(),
                param_name: param_name.to_string(),
                session_key,
                generation_id: session.generation_id.clone(),
                master_account_id: session.master_account_id.clone(),
                menu_chat_id: session.menu_chat_id.clone(),
                menu_msg_id: session.menu_msg_id.clone(),
            },
        );
        Ok(())
    }
}

pub struct TweakParamEditReplyHandler;

#[async_trait]
impl ReplyHandler for TweakParamEditReplyHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingReply, reply_context: ReplyContext) -> Result<()> {
        let (token, param_name, session_key) = match reply_context {
            ReplyContext::TweakParamEdit { token, param_name, session_key, .. } => (token, param_name, session_key),
            _ => return Err(DispatchError::ContextLoss),
        };

        let session = ctx.tweak_sessions().get(&session_key).map_err(|_| DispatchError::SessionLoss)?;
        let tool = resolve_tool_by_display_name(ctx, &session.tool_display_name).await?;
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

        ctx.tweak_sessions()
            .set_param(&session_key, &param_name, parsed.into_json())
            .map_err(|_| DispatchError::SessionLoss)?;

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

        let updated = ctx.tweak_sessions().get(&session_key).map_err(|_| DispatchError::SessionLoss)?;
        let message = render_tweak_menu(&tool, &updated, &token);
        let menu_target = MessageRef {
            chat_id: updated.menu_chat_id.clone(),
            message_id: updated.menu_msg_id.clone(),
        };
        ctx.transport().edit(&menu_target, &message).await.ok();
        Ok(())
    }
}

pub struct TweakApplyHandler;

#[async_trait]
impl CallbackHandler for TweakApplyHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let token = remainder;
        let session_key = match ctx.tweak_tokens().resolve(token) {
            Ok(k) => k,
            Err(_) => return expire_menu(ctx, event).await,
        };
        let session = match ctx.tweak_sessions().get(&session_key) {
            Ok(s) => s,
            Err(_) => return expire_menu(ctx, event).await,
        };

        let ancestor = fetch_ancestor(ctx, &session.generation_id).await?;
        let tool = resolve_tool_by_display_name(ctx, &session.tool_display_name).await?;

        let input = TweakApplyInput {
            ancestor: &ancestor,
            tool: &tool,
            params: &session.params,
            master_account_id: &session.master_account_id,
            menu_chat_id: &session.menu_chat_id,
            menu_msg_id: &session.menu_msg_id,
        };

        let applied = interact_execute::tweak::apply(ctx.data(), input).await;

        let target = MessageRef {
            chat_id: session.menu_chat_id.clone(),
            message_id: session.menu_msg_id.clone(),
        };

        match applied {
            Ok(_generation_id) => {
                ctx.tweak_sessions().destroy(&session_key);
                ctx.tweak_tokens().remove_by_key(&session_key);

                if session.is_new_menu {
                    let sent_msg = OutgoingMessage::text(escape("\u{1F680} sent"), InlineKeyboard::new());
                    ctx.transport().edit(&target, &sent_msg).await.ok();
                    ctx.transport().delete(&target).await.ok();
                } else {
                    let mut restored = delivery::build_delivery_card(&ancestor);
                    if let Some(orig) = session.orig_keyboard.as_deref().and_then(|s| serde_json::from_str::<InlineKeyboard>(s).ok()) {
                        restored.keyboard = orig;
                    }
                    if let Some((r, c)) = restored.keyboard.find_by_prefix(TWEAK_GEN_PREFIX) {
                        let current_label = restored.keyboard.button_at(r, c).map(|b| b.text.clone()).unwrap_or_else(|| "\u{270E}".to_string());
                        let next_label = delivery::increment_counter_label("\u{270E}", &current_label);
                        restored.keyboard.replace_at(r, c, InlineButton::new(next_label, tweak_gen(&session.generation_id)));
                    } else {
                        tracing::warn!(generation_id = %session.generation_id, "tweak button not found in keyboard to restore counter");
                    }
                    ctx.transport().edit(&target, &restored).await.ok();
                }
                Ok(())
            }
            Err(e) => Err(DispatchError::ExecutionFailed(e)),
        }
    }
}

/// `tweak_gen_menu_render:<genId>` — re-render an already-open tweak menu
/// from its live session without touching any parameter value (§6).
pub struct TweakMenuRenderHandler;

#[async_trait]
impl CallbackHandler for TweakMenuRenderHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let key = session_key(remainder, &event.sender.master_account_id);
        let session = match ctx.tweak_sessions().get(&key) {
            Ok(s) => s,
            Err(_) => return expire_menu(ctx, event).await,
        };
        let tool = resolve_tool_by_display_name(ctx, &session.tool_display_name).await?;
        let token = ctx.tweak_tokens().token_for(&key);
        let message = render_tweak_menu(&tool, &session, &token);
        let target = MessageRef {
            chat_id: session.menu_chat_id.clone(),
            message_id: session.menu_msg_id.clone(),
        };
        ctx.transport().edit(&target, &message).await.ok();
        Ok(())
    }
}

async fn expire_menu(ctx: &dyn InteractionContext, event: &IncomingCallback) -> Result<()> {
    let target = MessageRef {
        chat_id: event.chat_id.clone(),
        message_id: event.message_id.clone(),
    };
    let message = OutgoingMessage::text(escape("This has expired. Please try again."), InlineKeyboard::new());
    ctx.transport().edit(&target, &message).await.ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_core::types::{DeliveryMode, ParamSchema, ParamType};

    fn sample_tool() -> ToolDefinition {
        let mut input_schema = HashMap::new();
        input_schema.insert(
            "input_prompt".to_string(),
            ParamSchema { param_type: ParamType::String, default: None, description: None },
        );
        input_schema.insert(
            "input_steps".to_string(),
            ParamSchema { param_type: ParamType::Integer, default: None, description: None },
        );
        ToolDefinition {
            tool_id: "img-quick".to_string(),
            display_name: "Quick Image".to_string(),
            description: None,
            input_schema,
            metadata: Default::default(),
            delivery_mode: DeliveryMode::Immediate,
        }
    }

    fn sample_session(dirty: bool) -> TweakSession {
        let mut params = HashMap::new();
        params.insert("input_prompt".to_string(), serde_json::json!("a cat"));
        params.insert("input_steps".to_string(), serde_json::json!(20));
        TweakSession {
            generation_id: "g1".to_string(),
            master_account_id: "acct1".to_string(),
            canonical_tool_id: "img-quick".to_string(),
            tool_display_name: "Quick Image".to_string(),
            params,
            menu_chat_id: "chat1".to_string(),
            menu_msg_id: "msg1".to_string(),
            orig_keyboard: None,
            is_new_menu: false,
            dirty,
        }
    }

    #[test]
    fn render_tweak_menu_omits_send_button_when_clean() {
        let message = render_tweak_menu(&sample_tool(), &sample_session(false), "tok12345");
        let last_row = message.keyboard.rows().last().unwrap();
        assert!(last_row.iter().all(|b| !b.callback_data.starts_with("tweak_apply:")));
    }

    #[test]
    fn render_tweak_menu_shows_send_button_once_dirty() {
        let message = render_tweak_menu(&sample_tool(), &sample_session(true), "tok12345");
        let last_row = message.keyboard.rows().last().unwrap();
        assert!(last_row.iter().any(|b| b.callback_data.starts_with("tweak_apply:")));
    }

    #[test]
    fn render_tweak_menu_has_one_row_per_param_plus_actions() {
        let message = render_tweak_menu(&sample_tool(), &sample_session(false), "tok12345");
        assert_eq!(message.keyboard.rows().len(), 3);
    }
}
