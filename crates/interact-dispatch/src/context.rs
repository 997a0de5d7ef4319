//! The shared context trait every platform adapter depends on: one trait
//! implemented once by a central `AppState`, used by every handler and
//! adapter instead of threading six separate arguments.

use std::sync::Arc;

use interact_core::config::InteractConfig;
use interact_data::{DataApiClient, IdentityResolver, ToolRegistry};
use interact_state::{ReplyContextStore, TokenMap, TweakSessionStore};

use crate::transport::ChatTransport;

/// Everything a dispatcher or handler needs, independent of which platform
/// the interaction came from.
pub trait InteractionContext: Send + Sync {
    fn config(&self) -> &InteractConfig;
    fn data(&self) -> &DataApiClient;
    fn identity(&self) -> &IdentityResolver;
    fn tools(&self) -> &ToolRegistry;
    fn reply_contexts(&self) -> &ReplyContextStore;
    fn tweak_sessions(&self) -> &TweakSessionStore;
    fn tweak_tokens(&self) -> &TokenMap;
    /// The transport for the platform this particular event arrived on.
    fn transport(&self) -> &dyn ChatTransport;
}

/// Convenience alias used throughout handler signatures.
pub type SharedContext = Arc<dyn InteractionContext>;
