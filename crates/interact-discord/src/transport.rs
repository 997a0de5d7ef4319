//! [`ChatTransport`] implementation over serenity's `Http` REST client
//! (§6 "Chat transport"). Component interactions must be acknowledged
//! through the originating `Interaction` object rather than a bare id, so
//! this transport keeps a short-lived table of interactions awaiting their
//! [`ChatTransport::answer_callback`] call (§9 Design Notes).

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serenity::builder::{
    CreateEmbed, CreateInteractionResponse, CreateInteractionResponseFollowup, CreateMessage,
    EditMessage,
};
use serenity::http::Http;
use serenity::model::application::ComponentInteraction;
use serenity::model::id::{ChannelId, MessageId};

use interact_core::keyboard::InlineKeyboard;
use interact_core::outbound::{OutgoingMedia, OutgoingMessage};
use interact_core::safety::SafeText;
use interact_dispatch::transport::{ChatTransport, MessageRef, Result, TransportError};

use crate::keyboard::to_action_rows;

pub struct DiscordTransport {
    http: Arc<Http>,
    pending: DashMap<String, ComponentInteraction>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            pending: DashMap::new(),
        }
    }

    /// Record an interaction so a later `answer_callback(callback_id, ..)`
    /// can follow up on it. Called by the adapter right after the
    /// interaction has already been acknowledged (§9).
    pub fn track(&self, callback_id: String, interaction: ComponentInteraction) {
        self.pending.insert(callback_id, interaction);
    }
}

fn parse_channel_id(s: &str) -> std::result::Result<ChannelId, TransportError> {
    s.parse::<u64>()
        .map(ChannelId::new)
        .map_err(|e| TransportError::Request(format!("invalid channel id {s:?}: {e}")))
}

fn parse_message_id(s: &str) -> std::result::Result<MessageId, TransportError> {
    s.parse::<u64>()
        .map(MessageId::new)
        .map_err(|e| TransportError::Request(format!("invalid message id {s:?}: {e}")))
}

fn classify(err: serenity::Error) -> TransportError {
    match &err {
        serenity::Error::Http(http_err) => {
            let text = http_err.to_string().to_lowercase();
            if text.contains("unknown message") || text.contains("10008") {
                TransportError::CantEdit
            } else {
                TransportError::Request(err.to_string())
            }
        }
        _ => TransportError::Request(err.to_string()),
    }
}

fn embed_for(media: &OutgoingMedia) -> Option<CreateEmbed> {
    match media {
        OutgoingMedia::Photo { url } => Some(CreateEmbed::new().image(url)),
        _ => None,
    }
}

/// Animations/videos are external URLs; Discord has no REST "send a video
/// message" call for a URL we don't control, so the link is appended to the
/// body and left to Discord's own unfurler to render inline.
fn body_with_link(body: &str, media: &OutgoingMedia) -> String {
    match media {
        OutgoingMedia::Animation { url } | OutgoingMedia::Video { url } => {
            format!("{body}\n{url}")
        }
        _ => body.to_string(),
    }
}

#[async_trait]
impl ChatTransport for DiscordTransport {
    async fn send(&self, chat_id: &str, reply_to: Option<&str>, message: &OutgoingMessage) -> Result<MessageRef> {
        let channel = parse_channel_id(chat_id)?;
        let body = body_with_link(message.body.as_str(), &message.media);

        let mut builder = CreateMessage::new().content(body);
        if let Some(embed) = embed_for(&message.media) {
            builder = builder.embed(embed);
        }
        if !message.keyboard.is_empty() {
            builder = builder.components(to_action_rows(&message.keyboard));
        }
        if let Some(r) = reply_to {
            builder = builder.reference_message((channel, parse_message_id(r)?));
        }

        let sent = channel.send_message(&self.http, builder).await.map_err(classify)?;

        Ok(MessageRef {
            chat_id: chat_id.to_string(),
            message_id: sent.id.to_string(),
        })
    }

    async fn edit(&self, target: &MessageRef, message: &OutgoingMessage) -> Result<()> {
        let channel = parse_channel_id(&target.chat_id)?;
        let msg_id = parse_message_id(&target.message_id)?;
        let body = body_with_link(message.body.as_str(), &message.media);

        let mut builder = EditMessage::new().content(body);
        if let Some(embed) = embed_for(&message.media) {
            builder = builder.embed(embed);
        }
        builder = builder.components(if message.keyboard.is_empty() {
            Vec::new()
        } else {
            to_action_rows(&message.keyboard)
        });

        channel
            .edit_message(&self.http, msg_id, builder)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn edit_keyboard(&self, target: &MessageRef, keyboard: &InlineKeyboard) -> Result<()> {
        let channel = parse_channel_id(&target.chat_id)?;
        let msg_id = parse_message_id(&target.message_id)?;
        let components = if keyboard.is_empty() {
            Vec::new()
        } else {
            to_action_rows(keyboard)
        };
        channel
            .edit_message(&self.http, msg_id, EditMessage::new().components(components))
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn delete(&self, target: &MessageRef) -> Result<()> {
        let channel = parse_channel_id(&target.chat_id)?;
        let msg_id = parse_message_id(&target.message_id)?;
        channel
            .delete_message(&self.http, msg_id)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }

    /// Discord component interactions are already acknowledged by the
    /// adapter the moment they arrive (§7, 3-second interaction deadline);
    /// this follows up with an ephemeral message carrying `text`, if any.
    async fn answer_callback(&self, callback_id: &str, text: Option<&SafeText>, _alert: bool) -> Result<()> {
        let Some((_, interaction)) = self.pending.remove(callback_id) else {
            return Ok(());
        };
        if let Some(t) = text {
            let followup = CreateInteractionResponseFollowup::new()
                .ephemeral(true)
                .content(t.as_str());
            interaction
                .create_followup(&self.http, followup)
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
        }
        Ok(())
    }
}

/// Acknowledge a freshly-received component interaction without revealing
/// any visible change, so Discord clears its loading spinner before the
/// dispatcher has necessarily finished (§7).
pub async fn acknowledge(http: &Http, interaction: &ComponentInteraction) -> Result<()> {
    interaction
        .create_response(http, CreateInteractionResponse::Acknowledge)
        .await
        .map_err(|e| TransportError::Request(e.to_string()))
}
