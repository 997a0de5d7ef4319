//! C4 Dispatchers: three prefix/regex routers plus a fallback dynamic
//! matcher (§4.1). Each is a flat `Vec` scanned linearly — handlers are few
//! and prefixes short, so a trie buys nothing (§9 "an implementer may
//! switch to a trie without altering semantics").

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::auth;
use crate::context::InteractionContext;
use crate::error::{DispatchError, Result};
use crate::event::{IncomingCallback, IncomingCommand, IncomingReply};
use interact_core::config::CALLBACK_DATA_MAX_BYTES;
use interact_state::ReplyContext;

/// A single capture group from a matched command regex (owned, since
/// `regex::Captures` borrows from the input and can't cross an `async_trait`
/// object-safe boundary cleanly).
#[derive(Debug, Clone, Default)]
pub struct CommandMatch {
    pub groups: Vec<Option<String>>,
}

impl CommandMatch {
    pub fn get(&self, i: usize) -> Option<&str> {
        self.groups.get(i).and_then(|g| g.as_deref())
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &dyn InteractionContext,
        event: &IncomingCommand,
        m: &CommandMatch,
    ) -> Result<()>;
}

#[async_trait]
pub trait CallbackHandler: Send + Sync {
    /// `remainder` is `callback_data` with the registered prefix stripped.
    async fn handle(
        &self,
        ctx: &dyn InteractionContext,
        event: &IncomingCallback,
        remainder: &str,
    ) -> Result<()>;
}

#[async_trait]
pub trait ReplyHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &dyn InteractionContext,
        event: &IncomingReply,
        reply_context: ReplyContext,
    ) -> Result<()>;
}

/// Consulted only when no `/`-command or reply-context matched (§4.1).
#[async_trait]
pub trait DynamicCommandHandler: Send + Sync {
    /// Returns `true` if this handler claimed and processed the message.
    async fn try_handle(&self, ctx: &dyn InteractionContext, event: &IncomingCommand) -> Result<bool>;
}

struct CommandRoute {
    regex: Regex,
    handler: Arc<dyn CommandHandler>,
}

/// Text starting with `/` is routed here; first matching regex wins (§4.1).
#[derive(Default)]
pub struct CommandDispatcher {
    routes: Vec<CommandRoute>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn register(&mut self, pattern: &str, handler: Arc<dyn CommandHandler>) {
        let regex = Regex::new(pattern).unwrap_or_else(|e| {
            panic!("invalid command dispatcher pattern {:?}: {}", pattern, e)
        });
        self.routes.push(CommandRoute { regex, handler });
    }

    /// Returns `true` if a registered regex matched and the handler ran.
    pub async fn dispatch(&self, ctx: &dyn InteractionContext, event: &IncomingCommand) -> Result<bool> {
        for route in &self.routes {
            if let Some(caps) = route.regex.captures(&event.text) {
                let groups = (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
                    .collect();
                debug!(pattern = route.regex.as_str(), "command dispatched");
                route.handler.handle(ctx, event, &CommandMatch { groups }).await?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

struct CallbackRoute {
    prefix: String,
    max_token_width: usize,
    handler: Arc<dyn CallbackHandler>,
}

/// Inline-button presses. First `startsWith` match on the registered prefix
/// wins (§4.1). Registration-time width verification per §9: the caller
/// declares the widest token it will ever append after the prefix, and
/// registration panics at boot if `prefix.len() + max_token_width` would
/// exceed the platform's 64-byte callback-data limit.
#[derive(Default)]
pub struct CallbackQueryDispatcher {
    routes: Vec<CallbackRoute>,
}

impl CallbackQueryDispatcher {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register `prefix` → `handler`. `max_token_width` bounds any token
    /// this handler appends after the prefix in generated callback-data.
    pub fn register(&mut self, prefix: &str, max_token_width: usize, handler: Arc<dyn CallbackHandler>) {
        assert!(
            prefix.len() + max_token_width <= CALLBACK_DATA_MAX_BYTES,
            "callback prefix {:?} plus token width {} exceeds the {}-byte limit",
            prefix,
            max_token_width,
            CALLBACK_DATA_MAX_BYTES
        );
        if let Some(existing) = self.routes.iter_mut().find(|r| r.prefix == prefix) {
            warn!(prefix, "overwriting existing callback prefix registration");
            existing.handler = handler;
            existing.max_token_width = max_token_width;
        } else {
            self.routes.push(CallbackRoute {
                prefix: prefix.to_string(),
                max_token_width,
                handler,
            });
        }
    }

    pub async fn dispatch(&self, ctx: &dyn InteractionContext, event: &IncomingCallback) -> Result<bool> {
        for route in &self.routes {
            if let Some(remainder) = event.callback_data.strip_prefix(route.prefix.as_str()) {
                debug!(prefix = route.prefix, "callback dispatched");
                if let Err(e) = auth::check(&route.prefix, event) {
                    warn!(prefix = route.prefix, "callback authorization denied");
                    return Err(e);
                }
                route.handler.handle(ctx, event, remainder).await?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

struct ReplyRoute {
    kind: &'static str,
    handler: Arc<dyn ReplyHandler>,
}

/// Exact `context.type` match against the replied-to message's stored
/// [`ReplyContext`] (§4.1).
#[derive(Default)]
pub struct MessageReplyDispatcher {
    routes: Vec<ReplyRoute>,
}

impl MessageReplyDispatcher {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn register(&mut self, kind: &'static str, handler: Arc<dyn ReplyHandler>) {
        if self.routes.iter().any(|r| r.kind == kind) {
            warn!(kind, "overwriting existing reply-context handler registration");
            self.routes.retain(|r| r.kind != kind);
        }
        self.routes.push(ReplyRoute { kind, handler });
    }

    /// Looks up the stored [`ReplyContext`] for `event.replied_to_message_id`
    /// and consumes it on a successful dispatch (§4.1, §8 invariant 4).
    pub async fn dispatch(&self, ctx: &dyn InteractionContext, event: &IncomingReply) -> Result<bool> {
        let context = match ctx
            .reply_contexts()
            .take(&event.chat_id, &event.replied_to_message_id)
        {
            Ok(c) => c,
            Err(_) => return Ok(false),
        };

        let kind = context.kind();
        match self.routes.iter().find(|r| r.kind == kind) {
            Some(route) => {
                route.handler.handle(ctx, event, context).await?;
                Ok(true)
            }
            None => {
                warn!(kind, "no reply handler registered for context kind");
                Ok(false)
            }
        }
    }
}

/// Fallback dynamic matcher, consulted only when nothing else matched
/// (§4.1). A thin `Vec` of candidates tried in registration order.
#[derive(Default)]
pub struct DynamicCommandDispatcher {
    handlers: Vec<Arc<dyn DynamicCommandHandler>>,
}

impl DynamicCommandDispatcher {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn register(&mut self, handler: Arc<dyn DynamicCommandHandler>) {
        self.handlers.push(handler);
    }

    pub async fn dispatch(&self, ctx: &dyn InteractionContext, event: &IncomingCommand) -> Result<bool> {
        for handler in &self.handlers {
            if handler.try_handle(ctx, event).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Ordering on inbound text message (§4.1): `/command` prefix → command
/// dispatcher; else if replying to a tracked prompt → reply dispatcher
/// (context consumed on success); else → dynamic dispatcher.
pub struct Dispatchers {
    pub commands: CommandDispatcher,
    pub callbacks: CallbackQueryDispatcher,
    pub replies: MessageReplyDispatcher,
    pub dynamic: DynamicCommandDispatcher,
}

impl Dispatchers {
    pub fn new() -> Self {
        Self {
            commands: CommandDispatcher::new(),
            callbacks: CallbackQueryDispatcher::new(),
            replies: MessageReplyDispatcher::new(),
            dynamic: DynamicCommandDispatcher::new(),
        }
    }

    pub async fn dispatch_command_or_reply(
        &self,
        ctx: &dyn InteractionContext,
        command_event: Option<&IncomingCommand>,
        reply_event: Option<&IncomingReply>,
    ) -> Result<bool> {
        if let Some(event) = command_event {
            if event.text.starts_with('/') && self.commands.dispatch(ctx, event).await? {
                return Ok(true);
            }
        }
        if let Some(event) = reply_event {
            if self.replies.dispatch(ctx, event).await? {
                return Ok(true);
            }
        }
        if let Some(event) = command_event {
            if self.dynamic.dispatch(ctx, event).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for Dispatchers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Sender;
    use interact_core::types::Platform;

    fn sample_sender() -> Sender {
        Sender {
            platform: Platform::Telegram,
            platform_id: "111".to_string(),
            username: None,
            first_name: None,
            master_account_id: "acct1".to_string(),
        }
    }

    #[test]
    #[should_panic]
    fn callback_register_panics_when_over_limit() {
        struct NoopHandler;
        #[async_trait]
        impl CallbackHandler for NoopHandler {
            async fn handle(&self, _: &dyn InteractionContext, _: &IncomingCallback, _: &str) -> Result<()> {
                Ok(())
            }
        }
        let mut dispatcher = CallbackQueryDispatcher::new();
        dispatcher.register(
            "a_very_long_prefix_that_is_already_close_to_the_limit_",
            16,
            Arc::new(NoopHandler),
        );
    }

    #[test]
    fn command_match_get_returns_captured_group() {
        let m = CommandMatch {
            groups: vec![Some("g1".to_string()), None],
        };
        assert_eq!(m.get(0), Some("g1"));
        assert_eq!(m.get(1), None);
        assert_eq!(m.get(2), None);
    }

    #[test]
    fn callback_dispatcher_overwrite_replaces_single_route() {
        struct NoopHandler;
        #[async_trait]
        impl CallbackHandler for NoopHandler {
            async fn handle(&self, _: &dyn InteractionContext, _: &IncomingCallback, _: &str) -> Result<()> {
                Ok(())
            }
        }

        let mut dispatcher = CallbackQueryDispatcher::new();
        dispatcher.register("hide_menu", 0, Arc::new(NoopHandler));
        dispatcher.register("hide_menu", 0, Arc::new(NoopHandler));
        assert_eq!(dispatcher.routes.len(), 1);
        assert_eq!(dispatcher.routes[0].prefix, "hide_menu");
    }

    #[test]
    fn sample_sender_has_expected_platform() {
        assert_eq!(sample_sender().platform, Platform::Telegram);
    }
}
