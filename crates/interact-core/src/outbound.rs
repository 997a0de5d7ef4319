//! Outbound message model sent to a [`ChatTransport`](interact-dispatch) —
//! the shared shape for delivery cards, menus, and ephemeral prompts (§4.6).

use crate::keyboard::InlineKeyboard;
use crate::safety::SafeText;

/// Primary content of an outbound message, mirroring `GenerationRecord`'s
/// `{text}` / `{images}` / `{animations}` / `{videos}` response shapes (§3).
#[derive(Debug, Clone)]
pub enum OutgoingMedia {
    Text,
    Photo { url: String },
    Animation { url: String },
    Video { url: String },
}

/// One message to be sent or used to replace an existing one.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub media: OutgoingMedia,
    /// Caption (for media) or body (for text), already escaped.
    pub body: SafeText,
    pub keyboard: InlineKeyboard,
}

impl OutgoingMessage {
    pub fn text(body: SafeText, keyboard: InlineKeyboard) -> Self {
        Self {
            media: OutgoingMedia::Text,
            body,
            keyboard,
        }
    }
}
