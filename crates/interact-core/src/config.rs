use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Hard cap on a single callback-data payload, per the chat transport's
/// 64-byte limit on inline-button `data` fields (shared by Telegram and
/// Discord custom-ids in practice).
pub const CALLBACK_DATA_MAX_BYTES: usize = 64;

/// Default TTL for reply contexts and tweak sessions (§3, §5).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3_600;

/// Default timeout applied to every data-API call (§5).
pub const DEFAULT_DATA_API_TIMEOUT_MS: u64 = 5_000;

/// Default chain ID for magic-amount wallet-link deposits (§4.8).
pub const DEFAULT_LINK_CHAIN_ID: u64 = 11_155_111;

/// Top-level config (interact.toml + INTERACT_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractConfig {
    pub data_api: DataApiConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            data_api: DataApiConfig {
                base_url: "http://127.0.0.1:4000".to_string(),
                service_key: "change-me".to_string(),
                timeout_ms: DEFAULT_DATA_API_TIMEOUT_MS,
            },
            channels: ChannelsConfig::default(),
            execution: ExecutionConfig::default(),
            state: StateConfig::default(),
            migration: MigrationConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Internal data API connection settings (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataApiConfig {
    /// Base path, e.g. `https://internal.example.com/internal/v1/data`.
    pub base_url: String,
    /// Sent as `X-Internal-Client-Key`.
    pub service_key: String,
    #[serde(default = "default_data_api_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_data_api_timeout_ms() -> u64 {
    DEFAULT_DATA_API_TIMEOUT_MS
}

/// Derived-generation execution endpoint settings (§4.4, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Override for the `/execute` path; defaults to the data-API base.
    pub endpoint_override: Option<String>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            endpoint_override: None,
        }
    }
}

/// Reply context / tweak session in-memory store settings (§3, §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// How often the TTL reaper sweeps the stores for expired entries.
    #[serde(default = "default_reap_interval_secs")]
    pub reap_interval_secs: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            reap_interval_secs: default_reap_interval_secs(),
        }
    }
}

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}
fn default_reap_interval_secs() -> u64 {
    60
}

/// Open-question resolutions that need a toggle rather than a hard choice
/// (§9 — `deploymentId` vs `comfy-`-prefixed `workflowId`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default = "bool_true")]
    pub strip_comfy_prefix: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            strip_comfy_prefix: true,
        }
    }
}

/// Gateway bind address and port for the ambient HTTP surface (health check).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

fn default_port() -> u16 {
    8089
}
fn default_bind() -> String {
    "127.0.0.1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelsConfig {
    pub telegram: Option<TelegramConfig>,
    pub discord: Option<DiscordConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// When true, guild messages are only processed when the bot is @mentioned.
    #[serde(default)]
    pub require_mention: bool,
    /// When true, direct messages (DMs) are accepted.
    #[serde(default = "bool_true")]
    pub dm_allowed: bool,
}

fn bool_true() -> bool {
    true
}

impl InteractConfig {
    /// Load config from a TOML file with `INTERACT_*` env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. `~/.interact/interact.toml`
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: InteractConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("INTERACT_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.interact/interact.toml", home)
}
