//! Platform-agnostic inbound event model. Telegram/Discord adapters
//! translate their native update types into these before calling into the
//! dispatchers, so handler code never depends on `teloxide` or `serenity`.

use interact_core::keyboard::InlineKeyboard;
use interact_core::types::Platform;

/// Who sent an inbound event, already carrying the resolved identity (C1
//  runs before dispatch, §2 flow).
#[derive(Debug, Clone)]
pub struct Sender {
    pub platform: Platform,
    pub platform_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub master_account_id: String,
}

/// A plain text message, possibly a `/command`.
#[derive(Debug, Clone)]
pub struct IncomingCommand {
    pub sender: Sender,
    pub chat_id: String,
    pub message_id: String,
    pub text: String,
    pub is_group: bool,
}

/// An inline-button press.
#[derive(Debug, Clone)]
pub struct IncomingCallback {
    pub sender: Sender,
    pub chat_id: String,
    /// The message the keyboard is attached to.
    pub message_id: String,
    /// The platform's own id for this callback-query press, passed to
    /// `ChatTransport::answer_callback` — distinct from `message_id`.
    pub callback_id: String,
    pub callback_data: String,
    pub is_group: bool,
    /// The user id that owns the message this keyboard is attached to, if
    /// the message is a reply to a command (§4.2 authorization).
    pub owner_user_id: Option<String>,
    /// The keyboard currently attached to `message_id`, as reported by the
    /// platform at callback time. Handlers that rebuild a keyboard (§4.4
    /// step 4, §4.5) must patch this snapshot rather than reconstruct a
    /// pristine one, or they discard other buttons' live state (e.g. a
    /// prior tweak/rerun press-counter). `None` if the platform didn't
    /// report one.
    pub current_keyboard: Option<InlineKeyboard>,
}

/// A user's reply to a bot-sent prompt message.
#[derive(Debug, Clone)]
pub struct IncomingReply {
    pub sender: Sender,
    pub chat_id: String,
    pub message_id: String,
    /// The id of the bot's prompt message this is a reply to — the key
    /// into the [`interact_state::ReplyContextStore`].
    pub replied_to_message_id: String,
    pub text: String,
    /// Set when the reply attaches a platform file (photo/document/etc.);
    /// its raw URL must be redacted before being echoed back (§4.4, §9).
    pub file_url: Option<String>,
}
