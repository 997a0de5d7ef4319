//! Tool-registry cache: looks up [`ToolDefinition`]s by canonical id or by
//! display name (§3 "ToolDefinition" — display name is the stable handle
//! across tool-id migrations, §4.4).

use std::sync::RwLock;

use interact_core::types::ToolDefinition;
use tracing::debug;

use crate::client::DataApiClient;
use crate::error::Result;

/// In-memory snapshot of the tool registry, refreshed on a miss. The
/// registry itself changes rarely relative to interaction volume, so a
/// simple "refresh whole list on miss" policy is sufficient — no partial
/// invalidation is needed.
pub struct ToolRegistry {
    tools: RwLock<Vec<ToolDefinition>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(Vec::new()),
        }
    }

    pub async fn refresh(&self, client: &DataApiClient) -> Result<()> {
        let tools = client.list_tools().await?;
        debug!(count = tools.len(), "refreshed tool registry");
        *self.tools.write().expect("tool registry lock poisoned") = tools;
        Ok(())
    }

    async fn ensure_loaded(&self, client: &DataApiClient) -> Result<()> {
        let empty = self.tools.read().expect("tool registry lock poisoned").is_empty();
        if empty {
            self.refresh(client).await?;
        }
        Ok(())
    }

    pub async fn by_id(&self, client: &DataApiClient, tool_id: &str) -> Result<Option<ToolDefinition>> {
        self.ensure_loaded(client).await?;
        let found = self
            .tools
            .read()
            .expect("tool registry lock poisoned")
            .iter()
            .find(|t| t.tool_id == tool_id)
            .cloned();
        if found.is_some() {
            return Ok(found);
        }
        // A tool id can migrate; one refresh retry before giving up.
        self.refresh(client).await?;
        Ok(self
            .tools
            .read()
            .expect("tool registry lock poisoned")
            .iter()
            .find(|t| t.tool_id == tool_id)
            .cloned())
    }

    /// Display-name lookup is authoritative for user-facing flows (§3):
    /// tool ids may migrate underneath a generation record, but the
    /// display name a user saw at generation time is stable.
    pub async fn by_display_name(
        &self,
        client: &DataApiClient,
        display_name: &str,
    ) -> Result<Option<ToolDefinition>> {
        self.ensure_loaded(client).await?;
        let found = self
            .tools
            .read()
            .expect("tool registry lock poisoned")
            .iter()
            .find(|t| t.display_name == display_name)
            .cloned();
        if found.is_some() {
            return Ok(found);
        }
        self.refresh(client).await?;
        Ok(self
            .tools
            .read()
            .expect("tool registry lock poisoned")
            .iter()
            .find(|t| t.display_name == display_name)
            .cloned())
    }

    pub async fn all(&self, client: &DataApiClient) -> Result<Vec<ToolDefinition>> {
        self.ensure_loaded(client).await?;
        Ok(self.tools.read().expect("tool registry lock poisoned").clone())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
