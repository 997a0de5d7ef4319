//! Small helpers shared by several feature handlers: ancestor/tool lookup
//! wraps the same two calls every tweak/rerun/info flow starts with.

use interact_core::types::{GenerationRecord, ToolDefinition};
use interact_execute::ExecuteError;

use interact_dispatch::{DispatchError, InteractionContext, Result};

/// Fetch the generation a button press refers to (§4.4 step 1, §4.5, §4.7).
pub async fn fetch_ancestor(ctx: &dyn InteractionContext, generation_id: &str) -> Result<GenerationRecord> {
    ctx.data()
        .get_generation(generation_id)
        .await
        .map(|envelope| envelope.record)
        .map_err(|_| DispatchError::AncestorMissing)
}

/// Resolve a tool by its display name — the stable handle across tool-id
/// migrations (§3, §4.4).
pub async fn resolve_tool_by_display_name(
    ctx: &dyn InteractionContext,
    display_name: &str,
) -> Result<ToolDefinition> {
    let found = ctx
        .tools()
        .by_display_name(ctx.data(), display_name)
        .await
        .map_err(|e| DispatchError::ExecutionFailed(ExecuteError::DataApi(e)))?;
    found.ok_or(DispatchError::ExecutionFailed(ExecuteError::ToolMissing))
}

/// Truncate a value's display form to `max_chars` with an ellipsis, used for
/// button labels (§4.3 "truncated to 12 chars + ellipsis if longer").
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}\u{2026}")
    }
}

/// Render a `serde_json::Value` as a short human string for button labels
/// and info listings.
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "Not set".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_strings_untouched() {
        assert_eq!(truncate_with_ellipsis("steps", 12), "steps");
    }

    #[test]
    fn truncate_adds_ellipsis_past_limit() {
        assert_eq!(truncate_with_ellipsis("a very long value indeed", 12), "a very long \u{2026}");
    }

    #[test]
    fn display_value_renders_null_as_not_set() {
        assert_eq!(display_value(&serde_json::Value::Null), "Not set");
    }
}
