//! Typed request/response structs for the internal data API (§6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use interact_core::types::{GenerationMetadata, GenerationRecord, ToolDefinition};

#[derive(Debug, Clone, Serialize)]
pub struct FindOrCreateUserRequest<'a> {
    pub platform: &'a str,
    pub platform_id: &'a str,
    pub platform_context: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindOrCreateUserResponse {
    pub master_account_id: String,
    #[serde(default)]
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusReport {
    pub points: f64,
    pub exp: f64,
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub live_tasks: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletEntry {
    pub address: String,
    #[serde(default)]
    pub chain_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MagicAmountRequest<'a> {
    pub chain_id: u64,
    pub wallet_address: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MagicAmountResponse {
    pub magic_amount_wei: String,
    pub expires_at: String,
    pub request_id: String,
    pub foundation_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformLinkRequest<'a> {
    pub requester_master_account_id: &'a str,
    pub wallet_address: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformLinkResponse {
    pub request_id: String,
    pub holder_master_account_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkRequestResolution {
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub report_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateGenerationRequest<'a> {
    pub master_account_id: &'a str,
    pub kind: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MostFrequentTool {
    pub tool_id: String,
    pub display_name: String,
    pub use_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEventRequest<'a> {
    pub event_type: &'a str,
    pub master_account_id: &'a str,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteRequest<'a> {
    pub tool_id: &'a str,
    pub inputs: HashMap<String, serde_json::Value>,
    pub user: &'a str,
    pub event_id: &'a str,
    pub metadata: &'a GenerationMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteResponse {
    pub generation_id: String,
    pub run_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationEnvelope {
    #[serde(flatten)]
    pub record: GenerationRecord,
}

/// Response envelope for the tool-registry listing, keyed identically to
/// `ToolDefinition` (§3 "ToolDefinition"). The registry itself is an
/// external collaborator (§1); this is the shape this core expects back.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolListEnvelope {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoraSummary {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub checkpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoraDetail {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub checkpoint: String,
    #[serde(default)]
    pub favorited: bool,
}
