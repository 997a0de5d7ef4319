//! Markdown escaping and file-URL redaction (§9 "Markdown safety").
//!
//! `SafeText` can only be constructed via [`escape`] or [`SafeText::trusted`]
//! (for compile-time string literals), so an unescaped, dynamic `&str`
//! cannot reach a transport send call by accident.

use std::fmt;

/// Characters that MUST be escaped with a leading `\` in Telegram's
/// MarkdownV2 dialect, per the platform's documented grammar.
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// A string that has already been escaped for the chat transport's markup
/// dialect (or is known to be a trusted literal). Transport `send`/`edit`
/// calls should accept `&SafeText`, not `&str`, for any dynamic content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeText(String);

impl SafeText {
    /// Wrap a string literal that is already safe (no user-supplied or
    /// dynamic content), e.g. a hardcoded button label.
    pub fn trusted(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Escape `text` for Telegram MarkdownV2 / Discord-safe plain rendering.
///
/// Every special character in [`MARKDOWN_V2_SPECIAL`] is prefixed with a
/// backslash. Idempotent on already-plain text.
pub fn escape(text: &str) -> SafeText {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    SafeText(out)
}

/// Redact a chat-transport file URL (which may embed a bot-token-scoped
/// path or a signed download secret) down to a placeholder, used when
/// echoing an attachment's source back into a tweak prompt (§4.4).
pub fn redact_file_url(text: &str) -> String {
    if looks_like_file_url(text) {
        "(telegram file)".to_string()
    } else {
        text.to_string()
    }
}

fn looks_like_file_url(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_special_chars() {
        let escaped = escape("a_b*c[d]e(f)g~h`i>j#k+l-m=n|o{p}q.r!s");
        assert_eq!(
            escaped.as_str(),
            "a\\_b\\*c\\[d\\]e\\(f\\)g\\~h\\`i\\>j\\#k\\+l\\-m\\=n\\|o\\{p\\}q\\.r\\!s"
        );
    }

    #[test]
    fn leaves_plain_text_unchanged() {
        assert_eq!(escape("hello world").as_str(), "hello world");
    }

    #[test]
    fn redacts_file_urls() {
        assert_eq!(redact_file_url("https://example.com/file/abc"), "(telegram file)");
        assert_eq!(redact_file_url("a cat sitting"), "a cat sitting");
    }
}
