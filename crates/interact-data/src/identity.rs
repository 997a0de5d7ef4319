//! Translates external platform identities into master account IDs (C1, §4.1).

use dashmap::DashMap;
use tracing::{debug, info};

use interact_core::types::{MasterAccountId, Platform};

use crate::client::DataApiClient;
use crate::error::Result;

/// Cap on the (platform, platform_id) → master_account_id cache. When the
/// cache is full, the whole table is cleared rather than tracking insertion
/// order — resolution just costs one extra data-API round trip on the next
/// miss, which is rare relative to cache hits in steady state.
const CACHE_MAX: usize = 4096;

#[derive(Debug, Clone)]
pub enum ResolvedIdentity {
    Known(MasterAccountId),
    NewlyCreated(MasterAccountId),
}

impl ResolvedIdentity {
    pub fn master_account_id(&self) -> &MasterAccountId {
        match self {
            ResolvedIdentity::Known(id) => id,
            ResolvedIdentity::NewlyCreated(id) => id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ResolvedIdentity::NewlyCreated(_))
    }
}

/// Resolves (platform, platform_id) pairs to master account IDs via the
/// data API, caching hits in memory so every inbound message doesn't incur
/// an HTTP round trip.
pub struct IdentityResolver {
    client: DataApiClient,
    cache: DashMap<(Platform, String), MasterAccountId>,
}

impl IdentityResolver {
    pub fn new(client: DataApiClient) -> Self {
        Self {
            client,
            cache: DashMap::new(),
        }
    }

    pub async fn resolve(
        &self,
        platform: Platform,
        platform_id: &str,
        platform_context: serde_json::Value,
    ) -> Result<ResolvedIdentity> {
        let key = (platform, platform_id.to_string());

        if let Some(cached) = self.cache.get(&key) {
            debug!(platform = %platform, platform_id, "identity cache hit");
            return Ok(ResolvedIdentity::Known(cached.clone()));
        }

        let resp = self
            .client
            .find_or_create_user(platform.as_str(), platform_id, platform_context)
            .await?;
        let master_account_id = MasterAccountId::from(resp.master_account_id);

        if self.cache.len() >= CACHE_MAX {
            self.cache.clear();
        }
        self.cache.insert(key, master_account_id.clone());

        if resp.is_new_user {
            info!(platform = %platform, platform_id, "new master account created");
            Ok(ResolvedIdentity::NewlyCreated(master_account_id))
        } else {
            Ok(ResolvedIdentity::Known(master_account_id))
        }
    }

    /// Drop a cached entry, e.g. after a platform link changes ownership.
    pub fn invalidate(&self, platform: Platform, platform_id: &str) {
        self.cache.remove(&(platform, platform_id.to_string()));
    }

    pub fn client(&self) -> &DataApiClient {
        &self.client
    }
}
