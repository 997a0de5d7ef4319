//! Discord channel adapter: translates serenity gateway events into the
//! platform-agnostic event model and drives them through the shared
//! dispatchers (§2 flow, §4.1 ordering, §7 error boundary), mirrored from
//! the Telegram long-polling adapter in this workspace.

use std::sync::Arc;
use std::time::Duration;

use serenity::async_trait;
use serenity::model::application::{ActionRowComponent, ComponentInteraction, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::user::User;
use serenity::prelude::{Context, EventHandler};
use serenity::Client;
use tracing::{error, info, warn};

use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::safety::escape;
use interact_core::types::Platform;
use interact_dispatch::event::{IncomingCallback, IncomingCommand, IncomingReply, Sender};
use interact_dispatch::registry::Dispatchers;
use interact_dispatch::{DispatchError, InteractionContext};

use crate::error::DiscordError;
use crate::transport::{self, DiscordTransport};

const BACKOFF_BASE_SECS: u64 = 5;
const BACKOFF_MAX_SECS: u64 = 300;
const MAX_ATTEMPTS: u32 = 10;
const JITTER_FRACTION: f64 = 0.10;

/// Exponential backoff with up-to-10% jitter (§4.11), matching
/// [`crate::adapter`]'s Telegram counterpart.
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

/// Validate the bot token against Discord's `GET /users/@me` with
/// exponential backoff before starting the gateway connection (§4.11),
/// matching [`crate::adapter`]'s Telegram counterpart.
pub async fn validate_token(http: &serenity::http::Http) -> std::result::Result<(), DiscordError> {
    let mut delay = BACKOFF_BASE_SECS;
    for attempt in 1..=MAX_ATTEMPTS {
        match http.get_current_user().await {
            Ok(user) => {
                info!(username = %user.name, attempt, "Discord: token validated");
                return Ok(());
            }
            Err(e) if attempt == MAX_ATTEMPTS => {
                return Err(DiscordError::InvalidToken(e.to_string()));
            }
            Err(e) => {
                warn!(attempt, error = %e, retry_after_secs = delay, "Discord: get_current_user failed, retrying");
                tokio::time::sleep(Duration::from_secs(delay)).await;
                delay = (delay * 2).min(BACKOFF_MAX_SECS);
            }
        }
    }
    unreachable!("backoff loop exited without returning")
}

fn convert_keyboard(components: &[serenity::model::application::ActionRow]) -> InlineKeyboard {
    let mut keyboard = InlineKeyboard::new();
    for row in components {
        let buttons = row
            .components
            .iter()
            .filter_map(|component| match component {
                ActionRowComponent::Button(button) => {
                    let custom_id = button.custom_id.clone()?;
                    let label = button.label.clone().unwrap_or_default();
                    Some(InlineButton::new(label, custom_id))
                }
                _ => None,
            })
            .collect();
        keyboard = keyboard.row(buttons);
    }
    keyboard
}

struct Handler {
    ctx: Arc<dyn InteractionContext>,
    dispatchers: Arc<Dispatchers>,
    transport: Arc<DiscordTransport>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(name = %ready.user.name, "Discord: bot connected");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        handle_message(&ctx, self.ctx.as_ref(), &self.dispatchers, msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            handle_component(&ctx, self.ctx.as_ref(), &self.dispatchers, &self.transport, component).await;
        }
    }
}

/// Builds the serenity client and drives it for the lifetime of the
/// process, reconnecting with backoff+jitter (§4.11) whenever the gateway
/// connection drops instead of ending the process. `ctx` must report
/// `transport` (as a trait object) from [`InteractionContext::transport`]
/// — both must wrap the same [`DiscordTransport`] instance so interaction
/// tracking and acknowledgement stay consistent (§9 Design Notes).
pub async fn run(
    token: String,
    ctx: Arc<dyn InteractionContext>,
    dispatchers: Arc<Dispatchers>,
    transport: Arc<DiscordTransport>,
) {
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut delay = BACKOFF_BASE_SECS;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let handler = Handler {
            ctx: ctx.clone(),
            dispatchers: dispatchers.clone(),
            transport: transport.clone(),
        };

        info!(attempt, "Discord: starting gateway client");
        match Client::builder(&token, intents).event_handler(handler).await {
            Ok(mut client) => {
                if let Err(e) = client.start().await {
                    error!(error = %e, "Discord: gateway client stopped with an error");
                }
            }
            Err(e) => {
                error!(error = %e, "Discord: failed to build gateway client");
            }
        }

        if attempt >= MAX_ATTEMPTS {
            error!(attempt, "Discord: gateway client exhausted reconnect attempts, giving up");
            return;
        }

        let jitter = jitter_secs(delay);
        warn!(attempt, retry_after_secs = delay + jitter, "Discord: gateway client stopped, reconnecting");
        tokio::time::sleep(Duration::from_secs(delay + jitter)).await;
        delay = (delay * 2).min(BACKOFF_MAX_SECS);
    }
}

async fn resolve_sender(ctx: &dyn InteractionContext, user: &User) -> std::result::Result<Sender, ()> {
    let platform_context = serde_json::json!({
        "userId": user.id.get(),
        "username": user.name,
        "globalName": user.global_name,
    });
    let identity = ctx
        .identity()
        .resolve(Platform::Discord, &user.id.get().to_string(), platform_context)
        .await
        .map_err(|_| ())?;
    Ok(Sender {
        platform: Platform::Discord,
        platform_id: user.id.get().to_string(),
        username: Some(user.name.clone()),
        first_name: user.global_name.clone(),
        master_account_id: identity.master_account_id().as_str().to_string(),
    })
}

async fn handle_message(ctx: &Context, app: &dyn InteractionContext, dispatchers: &Dispatchers, msg: Message) {
    let Ok(sender) = resolve_sender(app, &msg.author).await else {
        msg.channel_id.say(&ctx.http, "Couldn't identify your account.").await.ok();
        return;
    };

    let chat_id = msg.channel_id.to_string();
    let message_id = msg.id.to_string();
    let text = msg.content.clone();

    let command_event = IncomingCommand {
        sender: sender.clone(),
        chat_id: chat_id.clone(),
        message_id: message_id.clone(),
        text: text.clone(),
        is_group: msg.guild_id.is_some(),
    };

    let reply_event = if let Some(referenced) = msg.referenced_message.as_ref() {
        let file_url = msg.attachments.first().map(|a| a.url.clone());
        let reply_text = if text.is_empty() {
            file_url.clone().unwrap_or_default()
        } else {
            text.clone()
        };
        Some(IncomingReply {
            sender: sender.clone(),
            chat_id: chat_id.clone(),
            message_id: message_id.clone(),
            replied_to_message_id: referenced.id.to_string(),
            text: reply_text,
            file_url,
        })
    } else {
        None
    };

    let result = dispatchers
        .dispatch_command_or_reply(app, Some(&command_event), reply_event.as_ref())
        .await;

    if let Err(e) = result {
        error!(error = %e, code = e.code(), "Discord: handler error");
        let apology = escape(&e.user_message());
        msg.channel_id.say(&ctx.http, apology.as_str()).await.ok();
    }
}

async fn handle_component(
    ctx: &Context,
    app: &dyn InteractionContext,
    dispatchers: &Dispatchers,
    transport: &Arc<DiscordTransport>,
    component: ComponentInteraction,
) {
    // Discord gives an interaction 3 seconds to be acknowledged; resolve it
    // immediately and let any response text travel as a follow-up once
    // dispatch finishes (§7, §9 Design Notes).
    if let Err(e) = transport::acknowledge(&ctx.http, &component).await {
        warn!(error = %e, "Discord: failed to acknowledge component interaction");
    }

    let callback_id = component.id.to_string();
    transport.track(callback_id.clone(), component.clone());

    let Ok(sender) = resolve_sender(app, &component.user).await else {
        transport
            .answer_callback(&callback_id, Some(&escape("Couldn't identify your account.")), true)
            .await
            .ok();
        return;
    };

    let owner_user_id = component
        .message
        .referenced_message
        .as_ref()
        .map(|m| m.author.id.to_string());

    let event = IncomingCallback {
        sender,
        chat_id: component.channel_id.to_string(),
        message_id: component.message.id.to_string(),
        callback_id: callback_id.clone(),
        callback_data: component.data.custom_id.clone(),
        is_group: component.guild_id.is_some(),
        owner_user_id,
        current_keyboard: Some(convert_keyboard(&component.message.components)),
    };

    let result = dispatchers.callbacks.dispatch(app, &event).await;

    match result {
        Ok(_) => {
            transport.answer_callback(&callback_id, None, false).await.ok();
        }
        Err(DispatchError::Unauthorized) => {
            transport
                .answer_callback(&callback_id, Some(&escape("This menu isn't for you.")), true)
                .await
                .ok();
        }
        Err(e) => {
            error!(error = %e, code = e.code(), "Discord: callback handler error");
            transport
                .answer_callback(&callback_id, Some(&escape(&e.user_message())), true)
                .await
                .ok();
        }
    }
}

pub fn make_transport(http: Arc<serenity::http::Http>) -> DiscordTransport {
    DiscordTransport::new(http)
}
