use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque, authoritative cross-platform identity (§3 "Identity").
///
/// A `(platform, platformId)` pair resolves to exactly one
/// `MasterAccountId` via the data API; resolution is idempotent and
/// creates the account on first sight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MasterAccountId(pub String);

impl MasterAccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MasterAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MasterAccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MasterAccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Chat platform a given interaction originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Telegram,
    Discord,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram",
            Platform::Discord => "discord",
        }
    }

    /// Parses `GenerationRecord::source_platform` (case-insensitive) back
    /// into a [`Platform`]. Returns `None` for a tag this core doesn't
    /// bind a transport for.
    pub fn parse(tag: &str) -> Option<Platform> {
        match tag.to_ascii_lowercase().as_str() {
            "telegram" => Some(Platform::Telegram),
            "discord" => Some(Platform::Discord),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generation lifecycle state (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Whether the delivery card has been sent yet (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

/// A rating kind applied to a generation (§4.7, §6).
///
/// `Sad` and `Negative` are deliberately kept distinct: both map to the
/// same emoji on acknowledgement but are not unified at write-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingKind {
    Beautiful,
    Funny,
    Sad,
    Negative,
}

impl RatingKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beautiful" => Some(RatingKind::Beautiful),
            "funny" => Some(RatingKind::Funny),
            "sad" => Some(RatingKind::Sad),
            "negative" => Some(RatingKind::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingKind::Beautiful => "beautiful",
            RatingKind::Funny => "funny",
            RatingKind::Sad => "sad",
            RatingKind::Negative => "negative",
        }
    }

    /// Acknowledgement emoji shown to the clicker (§4.7).
    pub fn ack_emoji(&self) -> &'static str {
        match self {
            RatingKind::Beautiful => "\u{1F63B}\u{1F63B}\u{1F63B}",
            RatingKind::Funny => "\u{1F639}\u{1F639}\u{1F639}",
            RatingKind::Sad | RatingKind::Negative => "\u{1F63F}\u{1F63F}\u{1F63F}",
        }
    }
}

/// `{chatId, messageId, userId, username, firstName}` — redundant snapshot
/// of the originating platform context, carried in `GenerationRecord::metadata`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformContext {
    pub chat_id: Option<String>,
    pub message_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

/// `{chatId, messageId, replyToMessageId}` — where a completed generation's
/// delivery card must land (§3, §4.4, §4.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationContext {
    pub chat_id: Option<String>,
    pub message_id: Option<String>,
    pub reply_to_message_id: Option<String>,
}

/// Structured derived-generation metadata (§9 redesign note: a struct, not
/// a free-form map, to prevent silent key drift between tweak and rerun).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub telegram_message_id: Option<String>,
    pub telegram_chat_id: Option<String>,
    #[serde(default)]
    pub platform_context: PlatformContext,
    #[serde(default)]
    pub notification_context: NotificationContext,
    pub user_input_prompt: Option<String>,
    pub parent_generation_id: Option<String>,
    #[serde(default)]
    pub is_rerun: bool,
    #[serde(default)]
    pub is_tweaked: bool,
    #[serde(default)]
    pub rerun_count: u32,
    #[serde(default)]
    pub is_spell: bool,
    pub spell_name: Option<String>,
    #[serde(default)]
    pub step_generation_ids: Vec<String>,
    pub deployment_id: Option<String>,
    pub workflow_id: Option<String>,
    pub run_id: Option<String>,
    pub initiating_event_id: Option<String>,
    pub status_reason: Option<String>,
}

/// One of `{text}`, `{images:[{url}]}`, `{animations:[{url}]}`, `{videos:[{url}]}`
/// — the `data` field of the first `responsePayload` entry (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Text { text: String },
    Images { images: Vec<MediaUrl> },
    Animations { animations: Vec<MediaUrl> },
    Videos { videos: Vec<MediaUrl> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePayloadEntry {
    pub data: ResponseData,
}

/// Read-only (to this core) record of a single generation (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub tool_id: String,
    pub tool_display_name: String,
    pub service_name: String,
    pub request_payload: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub response_payload: Vec<ResponsePayloadEntry>,
    pub status: GenerationStatus,
    pub delivery_status: DeliveryStatus,
    pub source_platform: String,
    #[serde(default)]
    pub ratings: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub metadata: GenerationMetadata,
    pub created_at: String,
    pub updated_at: String,
}

impl GenerationRecord {
    /// First element's `data`, if any response has arrived yet.
    pub fn primary_response(&self) -> Option<&ResponseData> {
        self.response_payload.first().map(|e| &e.data)
    }
}

/// Declared type of a tool's input parameter, driving the shared
/// parameter-value parser (§4.3, §4.4, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    Integer,
    Boolean,
    String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSchema {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub default: Option<serde_json::Value>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub deployment_id: Option<String>,
    pub telegram_prompt_input_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Immediate,
    Async,
    Webhook,
}

/// A tool's shape, as read from the tool registry collaborator (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub tool_id: String,
    pub display_name: String,
    pub description: Option<String>,
    pub input_schema: HashMap<String, ParamSchema>,
    #[serde(default)]
    pub metadata: ToolMetadata,
    pub delivery_mode: DeliveryMode,
}
