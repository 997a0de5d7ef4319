//! The one transport interface every handler depends on (§9 "a single
//! `ChatTransport`"), implemented once per platform adapter
//! (`interact-telegram`, `interact-discord`). Handlers never touch
//! `teloxide`/`serenity` types directly.

use async_trait::async_trait;

use interact_core::keyboard::InlineKeyboard;
use interact_core::outbound::OutgoingMessage;
use interact_core::safety::SafeText;

/// Opaque handle to a sent message, enough to edit/delete it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: String,
    pub message_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The platform refused the edit — e.g. the message is too old, or the
    /// caller lost access to the chat (§7 "Transport edit failures").
    #[error("message can't be edited")]
    CantEdit,

    #[error("transport request failed: {0}")]
    Request(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Everything a handler needs to talk back to the chat platform. `&self`
/// throughout — adapters must support concurrent sends (§5 "No handler
/// holds a lock across a suspension point").
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message, optionally as a reply to `reply_to`.
    async fn send(
        &self,
        chat_id: &str,
        reply_to: Option<&str>,
        message: &OutgoingMessage,
    ) -> Result<MessageRef>;

    /// Edit an existing message's body/caption and keyboard in place.
    /// Returns [`TransportError::CantEdit`] when the platform rejects the
    /// edit (§4.4 step 1 "attempt to overlay ... in place").
    async fn edit(&self, target: &MessageRef, message: &OutgoingMessage) -> Result<()>;

    /// Edit only the keyboard, leaving body/caption untouched (§4.5 "edit
    /// the rerun button in place").
    async fn edit_keyboard(&self, target: &MessageRef, keyboard: &InlineKeyboard) -> Result<()>;

    async fn delete(&self, target: &MessageRef) -> Result<()>;

    /// Acknowledge a callback-query press. `alert=true` shows a modal
    /// instead of a transient toast (used for authorization denials and
    /// errors, §4.2, §7).
    async fn answer_callback(&self, callback_id: &str, text: Option<&SafeText>, alert: bool) -> Result<()>;
}
