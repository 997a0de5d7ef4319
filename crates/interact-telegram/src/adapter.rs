//! Telegram channel adapter: translates `teloxide` updates into the
//! platform-agnostic event model and drives them through the shared
//! dispatchers (§2 flow, §4.1 ordering, §7 error boundary).

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatKind, MediaKind, MessageKind, UpdateKind};
use tracing::{error, info, warn};

use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::safety::{escape, redact_file_url};
use interact_core::types::Platform;
use interact_dispatch::event::{IncomingCallback, IncomingCommand, IncomingReply, Sender};
use interact_dispatch::registry::Dispatchers;
use interact_dispatch::{DispatchError, InteractionContext};

use crate::error::TelegramError;
use crate::transport::TelegramTransport;

const BACKOFF_BASE_SECS: u64 = 5;
const BACKOFF_MAX_SECS: u64 = 300;
const MAX_ATTEMPTS: u32 = 10;
const JITTER_FRACTION: f64 = 0.10;

/// Exponential backoff with up-to-10% jitter (§4.11): `delay` doubles each
/// attempt up to `BACKOFF_MAX_SECS`, and a random amount in `[0, delay *
/// JITTER_FRACTION)` is added on top to avoid reconnect stampedes.
fn jitter_secs(base_secs: u64) -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let max_jitter = ((base_secs as f64) * JITTER_FRACTION) as u64;
    if max_jitter == 0 {
        return 0;
    }
    (nanos as u64) % max_jitter
}

/// Validate the bot token against Telegram's `getMe` with exponential
/// backoff before handing off to the long-polling loop (§4.11).
pub async fn validate_token(bot: &Bot) -> Result<(), TelegramError> {
    let mut delay = BACKOFF_BASE_SECS;
    for attempt in 1..=MAX_ATTEMPTS {
        match bot.get_me().await {
            Ok(me) => {
                info!(username = ?me.username(), attempt, "Telegram: token validated");
                return Ok(());
            }
            Err(e) if attempt == MAX_ATTEMPTS => {
                return Err(TelegramError::InvalidToken(e.to_string()));
            }
            Err(e) => {
                warn!(attempt, error = %e, retry_after_secs = delay, "Telegram: getMe failed, retrying");
                tokio::time::sleep(Duration::from_secs(delay)).await;
                delay = (delay * 2).min(BACKOFF_MAX_SECS);
            }
        }
    }
    unreachable!("backoff loop exited without returning")
}

/// Drives the long-polling event loop for the lifetime of the process,
/// reconnecting with backoff+jitter (§4.11) whenever the poll loop drops
/// instead of ending the process. `ctx` must report this platform's
/// [`TelegramTransport`] from [`InteractionContext::transport`].
pub async fn run(bot: Bot, ctx: Arc<dyn InteractionContext>, dispatchers: Arc<Dispatchers>) {
    let mut delay = BACKOFF_BASE_SECS;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint({
                let ctx = ctx.clone();
                let dispatchers = dispatchers.clone();
                move |bot: Bot, msg: Message| {
                    let ctx = ctx.clone();
                    let dispatchers = dispatchers.clone();
                    async move {
                        handle_message(&bot, ctx.as_ref(), &dispatchers, msg).await;
                        respond(())
                    }
                }
            }))
            .branch(Update::filter_callback_query().endpoint({
                let ctx = ctx.clone();
                let dispatchers = dispatchers.clone();
                move |bot: Bot, q: CallbackQuery| {
                    let ctx = ctx.clone();
                    let dispatchers = dispatchers.clone();
                    async move {
                        handle_callback(&bot, ctx.as_ref(), &dispatchers, q).await;
                        respond(())
                    }
                }
            }));

        info!(attempt, "Telegram: starting long-polling dispatcher");
        Dispatcher::builder(bot.clone(), handler)
            .default_handler(|_upd| async {})
            .build()
            .dispatch()
            .await;

        if attempt >= MAX_ATTEMPTS {
            error!(attempt, "Telegram: long-polling dispatcher exhausted reconnect attempts, giving up");
            return;
        }

        let jitter = jitter_secs(delay);
        warn!(attempt, retry_after_secs = delay + jitter, "Telegram: long-polling dispatcher exited, reconnecting");
        tokio::time::sleep(Duration::from_secs(delay + jitter)).await;
        delay = (delay * 2).min(BACKOFF_MAX_SECS);
    }
}

fn convert_keyboard(markup: &teloxide::types::InlineKeyboardMarkup) -> InlineKeyboard {
    let mut keyboard = InlineKeyboard::new();
    for row in &markup.inline_keyboard {
        let buttons = row
            .iter()
            .filter_map(|button| match &button.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                    Some(InlineButton::new(button.text.clone(), data.clone()))
                }
                _ => None,
            })
            .collect();
        keyboard = keyboard.row(buttons);
    }
    keyboard
}

fn is_group(chat_kind: &ChatKind) -> bool {
    matches!(chat_kind, ChatKind::Public(p) if matches!(
        p.kind,
        teloxide::types::PublicChatKind::Group(_) | teloxide::types::PublicChatKind::Supergroup(_)
    ))
}

/// Telegram's file-download URL embeds the bot token; it must never be
/// echoed back verbatim (§4.4, §9 "redacts file URLs containing secrets").
async fn first_attachment_url(bot: &Bot, msg: &Message) -> Option<String> {
    let file_id = match msg.kind {
        MessageKind::Common(ref common) => match &common.media_kind {
            MediaKind::Photo(p) => p.photo.last().map(|s| s.file.id.clone()),
            MediaKind::Document(d) => Some(d.document.file.id.clone()),
            MediaKind::Video(v) => Some(v.video.file.id.clone()),
            MediaKind::Animation(a) => Some(a.animation.file.id.clone()),
            _ => None,
        },
        _ => None,
    }?;
    match bot.get_file(&file_id).await {
        Ok(file) => Some(format!("https://api.telegram.org/file/bot{}/{}", bot.token(), file.path)),
        Err(e) => {
            warn!(file_id, error = %e, "Telegram: get_file failed while resolving attachment url");
            None
        }
    }
}

async fn resolve_sender(ctx: &dyn InteractionContext, user: &teloxide::types::User) -> Result<Sender, ()> {
    let platform_context = serde_json::json!({
        "chatId": null,
        "userId": user.id.0,
        "username": user.username,
        "firstName": user.first_name,
    });
    let identity = ctx
        .identity()
        .resolve(Platform::Telegram, &user.id.0.to_string(), platform_context)
        .await
        .map_err(|_| ())?;
    Ok(Sender {
        platform: Platform::Telegram,
        platform_id: user.id.0.to_string(),
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        master_account_id: identity.master_account_id().as_str().to_string(),
    })
}

async fn handle_message(bot: &Bot, ctx: &dyn InteractionContext, dispatchers: &Dispatchers, msg: Message) {
    let Some(user) = msg.from() else { return };
    let Ok(sender) = resolve_sender(ctx, user).await else {
        bot.send_message(msg.chat.id, "Couldn't identify your account.").await.ok();
        return;
    };

    let chat_id = msg.chat.id.0.to_string();
    let message_id = msg.id.0.to_string();
    let text = msg.text().unwrap_or_default().to_string();

    let command_event = IncomingCommand {
        sender: sender.clone(),
        chat_id: chat_id.clone(),
        message_id: message_id.clone(),
        text: text.clone(),
        is_group: is_group(&msg.chat.kind),
    };

    let reply_event = if let Some(replied) = msg.reply_to_message() {
        let file_url = first_attachment_url(bot, &msg).await;
        let reply_text = if text.is_empty() {
            file_url.as_deref().map(redact_file_url).unwrap_or_default()
        } else {
            text.clone()
        };
        Some(IncomingReply {
            sender: sender.clone(),
            chat_id: chat_id.clone(),
            message_id: message_id.clone(),
            replied_to_message_id: replied.id.0.to_string(),
            text: reply_text,
            file_url,
        })
    } else {
        None
    };

    let result = dispatchers
        .dispatch_command_or_reply(ctx, Some(&command_event), reply_event.as_ref())
        .await;

    if let Err(e) = result {
        error!(error = %e, code = e.code(), "Telegram: handler error");
        let apology = escape(&e.user_message());
        bot.send_message(msg.chat.id, apology.as_str()).await.ok();
    }
}

async fn handle_callback(bot: &Bot, ctx: &dyn InteractionContext, dispatchers: &Dispatchers, q: CallbackQuery) {
    let Ok(sender) = resolve_sender(ctx, &q.from).await else {
        bot.answer_callback_query(&q.id)
            .text("Couldn't identify your account.")
            .show_alert(true)
            .await
            .ok();
        return;
    };

    let Some(msg) = q.message.as_ref().and_then(|m| m.regular_message()) else {
        bot.answer_callback_query(&q.id).await.ok();
        return;
    };
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(&q.id).await.ok();
        return;
    };

    let owner_user_id = msg.reply_to_message().and_then(|m| m.from()).map(|u| u.id.0.to_string());

    let event = IncomingCallback {
        sender,
        chat_id: msg.chat.id.0.to_string(),
        message_id: msg.id.0.to_string(),
        callback_id: q.id.clone(),
        callback_data: data,
        is_group: is_group(&msg.chat.kind),
        owner_user_id,
        current_keyboard: msg.reply_markup().map(convert_keyboard),
    };

    let result = dispatchers.callbacks.dispatch(ctx, &event).await;

    match result {
        Ok(_) => {
            bot.answer_callback_query(&q.id).await.ok();
        }
        Err(DispatchError::Unauthorized) => {
            bot.answer_callback_query(&q.id)
                .text("This menu isn't for you.")
                .show_alert(true)
                .await
                .ok();
        }
        Err(e) => {
            error!(error = %e, code = e.code(), "Telegram: callback handler error");
            bot.answer_callback_query(&q.id)
                .text(e.user_message())
                .show_alert(true)
                .await
                .ok();
        }
    }
}

pub fn make_transport(bot: Bot) -> TelegramTransport {
    TelegramTransport::new(bot)
}
