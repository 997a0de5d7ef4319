//! Token ↔ session-key bimap (tweak only, §3 "Callback-token map").
//!
//! Inline-button callback-data has a 64-byte platform limit; a random
//! 8-character token aliases the full `generationId_masterAccountId`
//! session key so the callback payload stays short regardless of how long
//! those ids are.

use dashmap::DashMap;
use rand::Rng;

use crate::error::{Result, StateError};

const TOKEN_LEN: usize = 8;
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub struct TokenMap {
    token_to_key: DashMap<String, String>,
    key_to_token: DashMap<String, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self {
            token_to_key: DashMap::new(),
            key_to_token: DashMap::new(),
        }
    }

    /// Return the existing token for `session_key`, or mint and store a new
    /// one. Collisions regenerate — astronomically unlikely at this scale
    /// but cheap to guard against.
    pub fn token_for(&self, session_key: &str) -> String {
        if let Some(existing) = self.key_to_token.get(session_key) {
            return existing.clone();
        }

        let mut token = generate_token();
        while self.token_to_key.contains_key(&token) {
            token = generate_token();
        }

        self.token_to_key
            .insert(token.clone(), session_key.to_string());
        self.key_to_token
            .insert(session_key.to_string(), token.clone());
        token
    }

    pub fn resolve(&self, token: &str) -> Result<String> {
        self.token_to_key
            .get(token)
            .map(|v| v.clone())
            .ok_or(StateError::TokenNotFound)
    }

    pub fn remove_by_key(&self, session_key: &str) {
        if let Some((_, token)) = self.key_to_token.remove(session_key) {
            self.token_to_key.remove(&token);
        }
    }
}

impl Default for TokenMap {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_ALPHABET.len());
            TOKEN_ALPHABET[idx] as char
        })
        .collect()
}

/// Verify `prefix.len() + token_width <= CALLBACK_DATA_MAX_BYTES` at
/// registration time (§4.1, §9 "Callback-data length constraint").
pub fn assert_callback_width(prefix: &str, max_token_width: usize) {
    let total = prefix.len() + max_token_width;
    assert!(
        total <= interact_core::config::CALLBACK_DATA_MAX_BYTES,
        "callback prefix {:?} plus token width {} exceeds the {}-byte limit",
        prefix,
        max_token_width,
        interact_core::config::CALLBACK_DATA_MAX_BYTES
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_for_is_stable_per_key() {
        let map = TokenMap::new();
        let t1 = map.token_for("gen1_acct1");
        let t2 = map.token_for("gen1_acct1");
        assert_eq!(t1, t2);
        assert_eq!(t1.len(), TOKEN_LEN);
    }

    #[test]
    fn resolve_round_trips() {
        let map = TokenMap::new();
        let token = map.token_for("gen1_acct1");
        assert_eq!(map.resolve(&token).unwrap(), "gen1_acct1");
    }

    #[test]
    fn resolve_unknown_token_errors() {
        let map = TokenMap::new();
        assert!(matches!(map.resolve("ZZZZZZZZ"), Err(StateError::TokenNotFound)));
    }

    #[test]
    fn remove_by_key_drops_both_directions() {
        let map = TokenMap::new();
        let token = map.token_for("gen1_acct1");
        map.remove_by_key("gen1_acct1");
        assert!(map.resolve(&token).is_err());
    }

    #[test]
    #[should_panic]
    fn assert_callback_width_panics_when_too_wide() {
        assert_callback_width("a_very_long_prefix_that_is_already_close_to_the_limit_", 16);
    }

    #[test]
    fn assert_callback_width_accepts_short_prefix() {
        assert_callback_width("tpe_", 16);
    }
}
