//! Tweak session store (C3, §3 "TweakSession").
//!
//! Keyed by `generationId + "_" + masterAccountId`. Holds a shallow copy of
//! the ancestor generation's request payload overlaid with in-flight
//! parameter edits, plus bookkeeping fields needed to re-render the tweak
//! menu without another data-API round trip.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

use crate::error::{Result, StateError};

#[derive(Debug, Clone)]
pub struct TweakSession {
    pub generation_id: String,
    pub master_account_id: String,
    /// Original tool's canonical id, carried across edits so `apply` can
    /// re-submit against the right tool even if the display menu changes.
    pub canonical_tool_id: String,
    pub tool_display_name: String,
    /// Ancestor `requestPayload`, overlaid in place as each param is edited.
    pub params: HashMap<String, Value>,
    pub menu_chat_id: String,
    pub menu_msg_id: String,
    /// The delivery card's keyboard, serialized as it stood right before the
    /// tweak menu overlaid it, restored (with the tweak counter incremented)
    /// after a successful apply when the menu was edited in place.
    pub orig_keyboard: Option<String>,
    pub is_new_menu: bool,
    /// Set once any parameter has been edited since session init, so the
    /// menu can show a "Send" button only once a change is pending.
    pub dirty: bool,
}

struct Entry {
    session: TweakSession,
    expires_at: Instant,
}

pub fn session_key(generation_id: &str, master_account_id: &str) -> String {
    format!("{}_{}", generation_id, master_account_id)
}

/// Session key → `TweakSession`, TTL-bounded like [`crate::reply_context::ReplyContextStore`].
pub struct TweakSessionStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl TweakSessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    pub fn create(&self, key: String, session: TweakSession) {
        self.entries.insert(
            key,
            Entry {
                session,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn get(&self, key: &str) -> Result<TweakSession> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.session.clone()),
            Some(_) => {
                self.entries.remove(key);
                Err(StateError::TweakSessionNotFound)
            }
            None => Err(StateError::TweakSessionNotFound),
        }
    }

    /// Overlay a single parameter edit onto the session, refreshing its TTL.
    pub fn set_param(&self, key: &str, param_name: &str, value: Value) -> Result<()> {
        let mut entry = self
            .entries
            .get_mut(key)
            .ok_or(StateError::TweakSessionNotFound)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return Err(StateError::TweakSessionNotFound);
        }
        entry.session.params.insert(param_name.to_string(), value);
        entry.session.dirty = true;
        entry.expires_at = Instant::now() + self.ttl;
        Ok(())
    }

    /// Destroy the session: called on apply, cancel, or detected session loss.
    pub fn destroy(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn reap_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> TweakSession {
        TweakSession {
            generation_id: "gen1".to_string(),
            master_account_id: "acct1".to_string(),
            canonical_tool_id: "tool-1".to_string(),
            tool_display_name: "Flux Dev".to_string(),
            params: HashMap::new(),
            menu_chat_id: "chat1".to_string(),
            menu_msg_id: "msg1".to_string(),
            orig_keyboard: None,
            is_new_menu: true,
            dirty: false,
        }
    }

    #[test]
    fn session_key_matches_documented_format() {
        assert_eq!(session_key("gen1", "acct1"), "gen1_acct1");
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = TweakSessionStore::new(3600);
        let key = session_key("gen1", "acct1");
        store.create(key.clone(), sample_session());
        let session = store.get(&key).unwrap();
        assert_eq!(session.canonical_tool_id, "tool-1");
    }

    #[test]
    fn set_param_overlays_value() {
        let store = TweakSessionStore::new(3600);
        let key = session_key("gen1", "acct1");
        store.create(key.clone(), sample_session());
        store.set_param(&key, "steps", serde_json::json!(30)).unwrap();
        let session = store.get(&key).unwrap();
        assert_eq!(session.params.get("steps"), Some(&serde_json::json!(30)));
    }

    #[test]
    fn set_param_marks_session_dirty() {
        let store = TweakSessionStore::new(3600);
        let key = session_key("gen1", "acct1");
        store.create(key.clone(), sample_session());
        assert!(!store.get(&key).unwrap().dirty);
        store.set_param(&key, "steps", serde_json::json!(30)).unwrap();
        assert!(store.get(&key).unwrap().dirty);
    }

    #[test]
    fn destroy_removes_session() {
        let store = TweakSessionStore::new(3600);
        let key = session_key("gen1", "acct1");
        store.create(key.clone(), sample_session());
        store.destroy(&key);
        assert!(matches!(store.get(&key), Err(StateError::TweakSessionNotFound)));
    }

    #[test]
    fn expired_session_is_not_returned() {
        let store = TweakSessionStore::new(0);
        let key = session_key("gen1", "acct1");
        store.create(key.clone(), sample_session());
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(store.get(&key), Err(StateError::TweakSessionNotFound)));
    }
}
