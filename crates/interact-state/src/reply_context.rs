//! Reply-context store (C2, §3, §9 "Typed reply contexts").
//!
//! A `ReplyContext` is attached to a bot-sent prompt message and consumed
//! when the user replies to it. Keyed by `(chatId, messageId)` of the
//! prompt, with a default one-hour TTL swept by a background reaper.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::{Result, StateError};

/// Tagged reply-context payload, replacing the source's `{type, ...fields}`
/// stringly-typed grammar with one variant per handler (§9).
#[derive(Debug, Clone)]
pub enum ReplyContext {
    SettingsParamEdit {
        tool_id: String,
        param_name: String,
        menu_chat_id: String,
        menu_msg_id: String,
    },
    TweakParamEdit {
        token: String,
        param_name: String,
        session_key: String,
        generation_id: String,
        master_account_id: String,
        menu_chat_id: String,
        menu_msg_id: String,
    },
    /// Awaiting the wallet address to submit to the magic-amount deposit
    /// flow (§4.8), opened by the `/wallet` menu's "Add" button.
    WalletMagicAmount,
}

impl ReplyContext {
    /// Discriminant matched by the `MessageReplyDispatcher` (§4.1).
    pub fn kind(&self) -> &'static str {
        match self {
            ReplyContext::SettingsParamEdit { .. } => "settings_param_edit",
            ReplyContext::TweakParamEdit { .. } => "tweak_param_edit",
            ReplyContext::WalletMagicAmount => "wallet_magic_amount",
        }
    }
}

struct Entry {
    context: ReplyContext,
    expires_at: Instant,
}

/// `(chatId, messageId)` → `ReplyContext`, with TTL-based expiry.
pub struct ReplyContextStore {
    entries: DashMap<(String, String), Entry>,
    ttl: Duration,
}

impl ReplyContextStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    pub fn put(&self, chat_id: &str, message_id: &str, context: ReplyContext) {
        self.entries.insert(
            (chat_id.to_string(), message_id.to_string()),
            Entry {
                context,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Consume (remove) the context for this key, if present and unexpired.
    pub fn take(&self, chat_id: &str, message_id: &str) -> Result<ReplyContext> {
        let key = (chat_id.to_string(), message_id.to_string());
        match self.entries.remove(&key) {
            Some((_, entry)) if entry.expires_at > Instant::now() => Ok(entry.context),
            _ => Err(StateError::ReplyContextNotFound),
        }
    }

    /// Explicit removal without consuming the value (e.g. menu closed).
    pub fn remove(&self, chat_id: &str, message_id: &str) {
        self.entries
            .remove(&(chat_id.to_string(), message_id.to_string()));
    }

    /// Sweep expired entries. Intended to be called periodically by a
    /// background reaper task; a no-op on an already-consumed entry since
    /// `remove` already dropped it.
    pub fn reap_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_take_consumes_entry() {
        let store = ReplyContextStore::new(3600);
        store.put(
            "chat1",
            "msg1",
            ReplyContext::SettingsParamEdit {
                tool_id: "t1".to_string(),
                param_name: "steps".to_string(),
                menu_chat_id: "chat1".to_string(),
                menu_msg_id: "menu1".to_string(),
            },
        );
        assert_eq!(store.len(), 1);
        let ctx = store.take("chat1", "msg1").unwrap();
        assert_eq!(ctx.kind(), "settings_param_edit");
        assert!(store.is_empty());
    }

    #[test]
    fn take_missing_key_errors() {
        let store = ReplyContextStore::new(3600);
        assert!(matches!(
            store.take("nope", "nope"),
            Err(StateError::ReplyContextNotFound)
        ));
    }

    #[test]
    fn expired_entry_is_not_returned() {
        let store = ReplyContextStore::new(0);
        store.put(
            "chat1",
            "msg1",
            ReplyContext::SettingsParamEdit {
                tool_id: "t1".to_string(),
                param_name: "steps".to_string(),
                menu_chat_id: "chat1".to_string(),
                menu_msg_id: "menu1".to_string(),
            },
        );
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(
            store.take("chat1", "msg1"),
            Err(StateError::ReplyContextNotFound)
        ));
    }

    #[test]
    fn reap_expired_clears_stale_entries() {
        let store = ReplyContextStore::new(0);
        store.put(
            "chat1",
            "msg1",
            ReplyContext::SettingsParamEdit {
                tool_id: "t1".to_string(),
                param_name: "steps".to_string(),
                menu_chat_id: "chat1".to_string(),
                menu_msg_id: "menu1".to_string(),
            },
        );
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.reap_expired(), 1);
        assert!(store.is_empty());
    }
}
