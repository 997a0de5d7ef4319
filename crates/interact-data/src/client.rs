//! HTTP client for the external master-account data API (§6, C8).

use std::collections::HashMap;

use interact_core::config::DataApiConfig;
use interact_core::types::GenerationMetadata;
use tracing::{debug, warn};

use crate::error::{DataApiError, Result};
use interact_core::types::ToolDefinition;

use crate::types::{
    ExecuteRequest, ExecuteResponse, FindOrCreateUserRequest, FindOrCreateUserResponse,
    GenerationEnvelope, LinkRequestResolution, LogEventRequest, LoraDetail, LoraSummary,
    MagicAmountRequest, MagicAmountResponse, MostFrequentTool, PlatformLinkRequest,
    PlatformLinkResponse, RateGenerationRequest, StatusReport, ToolListEnvelope, WalletEntry,
};

/// Thin typed wrapper over the master-account data API. Every call injects
/// the service key and normalizes non-2xx responses into [`DataApiError`].
/// Cheap to clone: `reqwest::Client` is internally `Arc`-backed, so callers
/// that need their own copy (e.g. [`crate::identity::IdentityResolver`])
/// don't share a client reference with the rest of `AppCore`.
#[derive(Clone)]
pub struct DataApiClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl DataApiClient {
    pub fn new(cfg: &DataApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            service_key: cfg.service_key.clone(),
        }
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("X-Internal-Client-Key", &self.service_key)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let resp = self.with_auth(builder).send().await.map_err(|e| {
            if e.is_timeout() {
                DataApiError::Timeout { ms: 0 }
            } else {
                DataApiError::Request(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "data API error");
            return Err(DataApiError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(resp.json::<T>().await?)
    }

    pub async fn find_or_create_user(
        &self,
        platform: &str,
        platform_id: &str,
        platform_context: serde_json::Value,
    ) -> Result<FindOrCreateUserResponse> {
        let url = format!("{}/users/find-or-create", self.base_url);
        debug!(platform, platform_id, "resolving identity via data API");
        let body = FindOrCreateUserRequest {
            platform,
            platform_id,
            platform_context,
        };
        self.send_json(self.client.post(&url).json(&body)).await
    }

    pub async fn get_status(&self, master_account_id: &str) -> Result<StatusReport> {
        let url = format!("{}/users/{}/status-report", self.base_url, master_account_id);
        self.send_json(self.client.get(&url)).await
    }

    pub async fn list_wallets(&self, master_account_id: &str) -> Result<Vec<WalletEntry>> {
        let url = format!("{}/users/{}/wallets", self.base_url, master_account_id);
        self.send_json(self.client.get(&url)).await
    }

    pub async fn request_magic_amount(
        &self,
        master_account_id: &str,
        req: &MagicAmountRequest<'_>,
    ) -> Result<MagicAmountResponse> {
        let url = format!(
            "{}/users/{}/wallets/requests/magic-amount",
            self.base_url, master_account_id
        );
        self.send_json(self.client.post(&url).json(req)).await
    }

    pub async fn request_platform_link(
        &self,
        req: &PlatformLinkRequest<'_>,
    ) -> Result<PlatformLinkResponse> {
        let url = format!("{}/users/request-platform-link", self.base_url);
        self.send_json(self.client.post(&url).json(req)).await
    }

    /// `action` is one of `approve`, `reject`, `report` (§4.8, §6).
    pub async fn resolve_link_request(
        &self,
        request_id: &str,
        action: &str,
    ) -> Result<LinkRequestResolution> {
        let url = format!(
            "{}/users/link-requests/{}/{}",
            self.base_url, request_id, action
        );
        self.send_json(self.client.post(&url).json(&serde_json::json!({}))).await
    }

    pub async fn rate_generation(
        &self,
        generation_id: &str,
        req: &RateGenerationRequest<'_>,
    ) -> Result<()> {
        let url = format!("{}/generations/rate_gen/{}", self.base_url, generation_id);
        let resp = self
            .with_auth(self.client.post(&url).json(req))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(DataApiError::Api {
                status,
                message: text,
            });
        }
        Ok(())
    }

    pub async fn most_frequent_tools(
        &self,
        master_account_id: &str,
        limit: u32,
    ) -> Result<Vec<MostFrequentTool>> {
        let url = format!(
            "{}/generations/users/{}/most-frequent-tools?limit={}",
            self.base_url, master_account_id, limit
        );
        self.send_json(self.client.get(&url)).await
    }

    /// GET /users/{maid}/preferences/{toolId} — per-tool parameter defaults
    /// previously saved by the settings menu (§4.3).
    pub async fn get_tool_preferences(
        &self,
        master_account_id: &str,
        tool_id: &str,
    ) -> Result<Option<HashMap<String, serde_json::Value>>> {
        let url = format!(
            "{}/users/{}/preferences/{}",
            self.base_url, master_account_id, tool_id
        );
        let resp = self.with_auth(self.client.get(&url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(DataApiError::Api { status, message: text });
        }
        Ok(Some(resp.json().await?))
    }

    /// POST /users/{maid}/preferences/{toolId} — persist one parameter value.
    pub async fn set_tool_preference(
        &self,
        master_account_id: &str,
        tool_id: &str,
        param_name: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        let url = format!(
            "{}/users/{}/preferences/{}",
            self.base_url, master_account_id, tool_id
        );
        let body = serde_json::json!({ "param": param_name, "value": value });
        let resp = self.with_auth(self.client.post(&url).json(&body)).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(DataApiError::Api { status, message: text });
        }
        Ok(())
    }

    /// POST/DELETE /users/{maid}/preferences/lora-favorites/{loraId}.
    pub async fn set_lora_favorite(
        &self,
        master_account_id: &str,
        lora_id: &str,
        favorite: bool,
    ) -> Result<()> {
        let url = format!(
            "{}/users/{}/preferences/lora-favorites/{}",
            self.base_url, master_account_id, lora_id
        );
        let builder = if favorite {
            self.client.post(&url)
        } else {
            self.client.delete(&url)
        };
        let resp = self.with_auth(builder).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(DataApiError::Api { status, message: text });
        }
        Ok(())
    }

    pub async fn log_event(&self, req: &LogEventRequest<'_>) -> Result<()> {
        let url = format!("{}/events", self.base_url);
        let resp = self
            .with_auth(self.client.post(&url).json(req))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            warn!(status, "best-effort event log failed");
        }
        Ok(())
    }

    pub async fn execute_tool(
        &self,
        tool_id: &str,
        inputs: HashMap<String, serde_json::Value>,
        user: &str,
        event_id: &str,
        metadata: &GenerationMetadata,
    ) -> Result<ExecuteResponse> {
        let url = format!("{}/execute", self.base_url);
        let body = ExecuteRequest {
            tool_id,
            inputs,
            user,
            event_id,
            metadata,
        };
        self.send_json(self.client.post(&url).json(&body)).await
    }

    pub async fn get_generation(&self, generation_id: &str) -> Result<GenerationEnvelope> {
        let url = format!("{}/generations/{}", self.base_url, generation_id);
        self.send_json(self.client.get(&url)).await
    }

    /// PUT /generations/{id} — patch status/metadata, e.g. marking a nascent
    /// record `failed` with `statusReason` after a submission error (§7).
    pub async fn patch_generation(&self, generation_id: &str, patch: serde_json::Value) -> Result<()> {
        let url = format!("{}/generations/{}", self.base_url, generation_id);
        let resp = self.with_auth(self.client.put(&url).json(&patch)).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(DataApiError::Api { status, message: text });
        }
        Ok(())
    }

    pub async fn list_loras(&self, category: Option<&str>) -> Result<Vec<LoraSummary>> {
        let url = match category {
            Some(c) => format!("{}/loras/list?category={}", self.base_url, c),
            None => format!("{}/loras/list", self.base_url),
        };
        self.send_json(self.client.get(&url)).await
    }

    pub async fn get_lora(&self, lora_id: &str) -> Result<LoraDetail> {
        let url = format!("{}/loras/{}", self.base_url, lora_id);
        self.send_json(self.client.get(&url)).await
    }

    /// List every registered tool (§3 "ToolDefinition", §4.3 "All Tools").
    pub async fn list_tools(&self) -> Result<Vec<ToolDefinition>> {
        let url = format!("{}/tools/list", self.base_url);
        let envelope: ToolListEnvelope = self.send_json(self.client.get(&url)).await?;
        Ok(envelope.tools)
    }
}
