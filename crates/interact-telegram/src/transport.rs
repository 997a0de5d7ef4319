//! [`ChatTransport`] implementation over a teloxide `Bot` (§6 "Chat
//! transport"). The only place in this crate that speaks `teloxide` types
//! directly to the rest of the core — everything upstream of dispatch sees
//! only [`MessageRef`]/[`OutgoingMessage`]/[`InlineKeyboard`].

use async_trait::async_trait;
use teloxide::payloads::{SendAnimationSetters, SendMessageSetters, SendPhotoSetters, SendVideoSetters};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use interact_core::keyboard::InlineKeyboard;
use interact_core::outbound::{OutgoingMedia, OutgoingMessage};
use interact_core::safety::SafeText;
use interact_dispatch::transport::{ChatTransport, MessageRef, Result, TransportError};

use crate::keyboard::to_teloxide;

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn parse_chat_id(s: &str) -> std::result::Result<ChatId, TransportError> {
    s.parse::<i64>()
        .map(ChatId)
        .map_err(|e| TransportError::Request(format!("invalid chat id {s:?}: {e}")))
}

fn parse_message_id(s: &str) -> std::result::Result<teloxide::types::MessageId, TransportError> {
    s.parse::<i32>()
        .map(teloxide::types::MessageId)
        .map_err(|e| TransportError::Request(format!("invalid message id {s:?}: {e}")))
}

/// Telegram surfaces a stale/too-old edit target as a generic `ApiError`
/// whose description mentions the message; teloxide doesn't give us a typed
/// variant for it, so we match on the rendered text (§7 "Transport edit
/// failures").
fn classify(err: teloxide::RequestError) -> TransportError {
    let text = err.to_string().to_lowercase();
    if text.contains("message to edit not found")
        || text.contains("can't be edited")
        || text.contains("message is not modified")
        || text.contains("message_id_invalid")
    {
        TransportError::CantEdit
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: &str, reply_to: Option<&str>, message: &OutgoingMessage) -> Result<MessageRef> {
        let chat = parse_chat_id(chat_id)?;
        let markup = to_teloxide(&message.keyboard);
        let body = message.body.as_str().to_string();

        let sent = match &message.media {
            OutgoingMedia::Text => {
                let mut req = self.bot.send_message(chat, &body).parse_mode(ParseMode::MarkdownV2);
                if !message.keyboard.is_empty() {
                    req = req.reply_markup(markup);
                }
                if let Some(r) = reply_to {
                    req = req.reply_to_message_id(parse_message_id(r)?);
                }
                req.await
            }
            OutgoingMedia::Photo { url } => {
                let mut req = self
                    .bot
                    .send_photo(chat, InputFile::url(url.parse().map_err(|e| {
                        TransportError::Request(format!("invalid photo url: {e}"))
                    })?))
                    .caption(&body)
                    .parse_mode(ParseMode::MarkdownV2);
                if !message.keyboard.is_empty() {
                    req = req.reply_markup(markup);
                }
                if let Some(r) = reply_to {
                    req = req.reply_to_message_id(parse_message_id(r)?);
                }
                req.await
            }
            OutgoingMedia::Animation { url } => {
                let mut req = self
                    .bot
                    .send_animation(chat, InputFile::url(url.parse().map_err(|e| {
                        TransportError::Request(format!("invalid animation url: {e}"))
                    })?))
                    .caption(&body)
                    .parse_mode(ParseMode::MarkdownV2);
                if !message.keyboard.is_empty() {
                    req = req.reply_markup(markup);
                }
                if let Some(r) = reply_to {
                    req = req.reply_to_message_id(parse_message_id(r)?);
                }
                req.await
            }
            OutgoingMedia::Video { url } => {
                let mut req = self
                    .bot
                    .send_video(chat, InputFile::url(url.parse().map_err(|e| {
                        TransportError::Request(format!("invalid video url: {e}"))
                    })?))
                    .caption(&body)
                    .parse_mode(ParseMode::MarkdownV2);
                if !message.keyboard.is_empty() {
                    req = req.reply_markup(markup);
                }
                if let Some(r) = reply_to {
                    req = req.reply_to_message_id(parse_message_id(r)?);
                }
                req.await
            }
        }
        .map_err(classify)?;

        Ok(MessageRef {
            chat_id: chat_id.to_string(),
            message_id: sent.id.0.to_string(),
        })
    }

    async fn edit(&self, target: &MessageRef, message: &OutgoingMessage) -> Result<()> {
        let chat = parse_chat_id(&target.chat_id)?;
        let msg_id = parse_message_id(&target.message_id)?;
        let markup = to_teloxide(&message.keyboard);
        let body = message.body.as_str().to_string();

        let result = match &message.media {
            OutgoingMedia::Text => {
                let mut req = self
                    .bot
                    .edit_message_text(chat, msg_id, &body)
                    .parse_mode(ParseMode::MarkdownV2);
                if !message.keyboard.is_empty() {
                    req = req.reply_markup(markup);
                }
                req.await.map(|_| ())
            }
            OutgoingMedia::Photo { .. } | OutgoingMedia::Animation { .. } | OutgoingMedia::Video { .. } => {
                let mut req = self
                    .bot
                    .edit_message_caption(chat, msg_id)
                    .caption(&body)
                    .parse_mode(ParseMode::MarkdownV2);
                if !message.keyboard.is_empty() {
                    req = req.reply_markup(markup);
                }
                req.await.map(|_| ())
            }
        };

        result.map_err(classify)
    }

    async fn edit_keyboard(&self, target: &MessageRef, keyboard: &InlineKeyboard) -> Result<()> {
        let chat = parse_chat_id(&target.chat_id)?;
        let msg_id = parse_message_id(&target.message_id)?;

        let result = if keyboard.is_empty() {
            self.bot.edit_message_reply_markup(chat, msg_id).await
        } else {
            self.bot
                .edit_message_reply_markup(chat, msg_id)
                .reply_markup(to_teloxide(keyboard))
                .await
        };

        result.map(|_| ()).map_err(classify)
    }

    async fn delete(&self, target: &MessageRef) -> Result<()> {
        let chat = parse_chat_id(&target.chat_id)?;
        let msg_id = parse_message_id(&target.message_id)?;
        self.bot
            .delete_message(chat, msg_id)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::Request(e.to_string()))
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&SafeText>, alert: bool) -> Result<()> {
        let mut req = self.bot.answer_callback_query(callback_id).show_alert(alert);
        if let Some(t) = text {
            req = req.text(t.as_str());
        }
        req.await
            .map(|_| ())
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}
