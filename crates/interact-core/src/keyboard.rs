//! Platform-agnostic inline-keyboard model (§4, §6 "Callback-data grammar").
//!
//! Telegram and Discord both expose a grid of pressable buttons attached to
//! a message; each carries a short opaque payload that round-trips back to
//! the bot on press. This module models that grid without committing to
//! either platform's button type, so `interact-handlers` can build and
//! inspect keyboards without a transport dependency.

use serde::{Deserialize, Serialize};

use crate::config::CALLBACK_DATA_MAX_BYTES;

/// A single pressable button: visible `text` plus the `callback_data`
/// echoed back on press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        let callback_data = callback_data.into();
        debug_assert!(
            callback_data.len() <= CALLBACK_DATA_MAX_BYTES,
            "callback_data {:?} exceeds {} bytes",
            callback_data,
            CALLBACK_DATA_MAX_BYTES
        );
        Self {
            text: text.into(),
            callback_data,
        }
    }
}

/// A grid of buttons, row-major, exactly as sent to either transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard(pub Vec<Vec<InlineButton>>);

impl InlineKeyboard {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.0.push(buttons);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|row| row.is_empty())
    }

    pub fn rows(&self) -> &[Vec<InlineButton>] {
        &self.0
    }

    /// Locate the first button whose `callback_data` starts with `prefix`,
    /// returning its row/column position (§4.5 "find the counter button").
    pub fn find_by_prefix(&self, prefix: &str) -> Option<(usize, usize)> {
        for (r, row) in self.0.iter().enumerate() {
            for (c, button) in row.iter().enumerate() {
                if button.callback_data.starts_with(prefix) {
                    return Some((r, c));
                }
            }
        }
        None
    }

    pub fn button_at(&self, r: usize, c: usize) -> Option<&InlineButton> {
        self.0.get(r).and_then(|row| row.get(c))
    }

    /// Replace the button at `(r, c)` in place, returning `true` if it existed.
    pub fn replace_at(&mut self, r: usize, c: usize, button: InlineButton) -> bool {
        if let Some(row) = self.0.get_mut(r) {
            if let Some(slot) = row.get_mut(c) {
                *slot = button;
                return true;
            }
        }
        false
    }

    /// Every callback payload across the keyboard is within the platform limit.
    pub fn all_within_limit(&self) -> bool {
        self.0
            .iter()
            .flatten()
            .all(|b| b.callback_data.len() <= CALLBACK_DATA_MAX_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_prefix_locates_button() {
        let kb = InlineKeyboard::new().row(vec![
            InlineButton::new("✎", "tweak_gen:g1"),
            InlineButton::new("↻", "rerun_gen:g1"),
        ]);
        assert_eq!(kb.find_by_prefix("rerun_gen:"), Some((0, 1)));
        assert_eq!(kb.find_by_prefix("missing:"), None);
    }

    #[test]
    fn replace_at_swaps_button_text() {
        let mut kb = InlineKeyboard::new().row(vec![InlineButton::new("↻", "rerun_gen:g1:0")]);
        assert!(kb.replace_at(0, 0, InlineButton::new("↻1", "rerun_gen:g1:1")));
        assert_eq!(kb.button_at(0, 0).unwrap().text, "↻1");
    }

    #[test]
    fn replace_at_missing_position_returns_false() {
        let mut kb = InlineKeyboard::new();
        assert!(!kb.replace_at(0, 0, InlineButton::new("x", "y")));
    }
}
