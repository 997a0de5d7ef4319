//! Central wiring: one [`AppCore`] holding every shared collaborator (C1,
//! C2, C3, C8, the tool registry), and a thin per-platform
//! [`PlatformContext`] that pairs it with that platform's
//! [`ChatTransport`] to satisfy [`InteractionContext`] (§4.0). Telegram and
//! Discord each get their own `PlatformContext` instance; everything else
//! is shared.

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use dashmap::DashMap;

use interact_core::config::InteractConfig;
use interact_core::types::Platform;
use interact_data::{DataApiClient, IdentityResolver, ToolRegistry};
use interact_dispatch::transport::ChatTransport;
use interact_dispatch::InteractionContext;
use interact_state::{ReplyContextStore, TokenMap, TweakSessionStore};

/// Everything a [`PlatformContext`] needs regardless of which chat platform
/// it serves. Constructed once at startup and shared behind an `Arc` by
/// every platform adapter and the HTTP notification surface.
pub struct AppCore {
    pub config: InteractConfig,
    pub data: DataApiClient,
    pub identity: IdentityResolver,
    pub tools: ToolRegistry,
    pub reply_contexts: Arc<ReplyContextStore>,
    pub tweak_sessions: Arc<TweakSessionStore>,
    pub tweak_tokens: TokenMap,
    /// Outbound transport for each connected platform, registered once its
    /// adapter is constructed (`main.rs`). Used by the `/notify`
    /// generation-complete handler to deliver C6's result to whichever
    /// platform the ancestor command originated from, since an external
    /// notifier can invoke delivery much later than the originating event
    /// (§2 flow, §4.6).
    pub transports: DashMap<Platform, Arc<dyn ChatTransport>>,
}

impl AppCore {
    pub fn new(config: InteractConfig) -> Self {
        let data = DataApiClient::new(&config.data_api);
        let identity = IdentityResolver::new(DataApiClient::new(&config.data_api));
        let ttl = config.state.session_ttl_secs;
        Self {
            reply_contexts: Arc::new(ReplyContextStore::new(ttl)),
            tweak_sessions: Arc::new(TweakSessionStore::new(ttl)),
            tweak_tokens: TokenMap::new(),
            tools: ToolRegistry::new(),
            transports: DashMap::new(),
            identity,
            data,
            config,
        }
    }

    pub fn register_transport(&self, platform: Platform, transport: Arc<dyn ChatTransport>) {
        self.transports.insert(platform, transport);
    }
}

/// Binds a shared [`AppCore`] to one platform's transport, satisfying
/// [`InteractionContext`] (§4.0). Cheap to construct — one per adapter,
/// all sharing the same core.
pub struct PlatformContext<T: ChatTransport> {
    core: Arc<AppCore>,
    transport: Arc<T>,
}

impl<T: ChatTransport> PlatformContext<T> {
    pub fn new(core: Arc<AppCore>, transport: Arc<T>) -> Self {
        Self { core, transport }
    }
}

impl<T: ChatTransport> InteractionContext for PlatformContext<T> {
    fn config(&self) -> &InteractConfig {
        &self.core.config
    }

    fn data(&self) -> &DataApiClient {
        &self.core.data
    }

    fn identity(&self) -> &IdentityResolver {
        &self.core.identity
    }

    fn tools(&self) -> &ToolRegistry {
        &self.core.tools
    }

    fn reply_contexts(&self) -> &ReplyContextStore {
        self.core.reply_contexts.as_ref()
    }

    fn tweak_sessions(&self) -> &TweakSessionStore {
        self.core.tweak_sessions.as_ref()
    }

    fn tweak_tokens(&self) -> &TokenMap {
        &self.core.tweak_tokens
    }

    fn transport(&self) -> &dyn ChatTransport {
        self.transport.as_ref()
    }
}

/// The gateway's HTTP surface: a liveness check plus the generation-complete
/// notification ingress that triggers C6 delivery.
pub fn build_router(core: Arc<AppCore>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/notify/generation-complete",
            post(crate::http::notify::generation_complete_handler),
        )
        .with_state(core)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
