//! Rerun submission — clone the ancestor payload, mutate `input_seed`, and
//! resubmit (§4.5, §8 invariant 3).

use std::collections::HashMap;

use interact_core::types::{GenerationMetadata, GenerationRecord, NotificationContext, ToolDefinition};
use interact_data::types::LogEventRequest;
use interact_data::DataApiClient;
use rand::Rng;
use tracing::warn;

use crate::error::Result;

/// Mutate `input_seed` per §4.5 / §8 invariant 3: increment by one if it
/// was a number, otherwise (missing or non-numeric) replace it with a
/// fresh random value in `[0, 2^31)`.
pub fn mutate_seed(params: &mut HashMap<String, serde_json::Value>) {
    let next = match params.get("input_seed").and_then(|v| v.as_i64()) {
        Some(seed) => seed.wrapping_add(1),
        None => rand::thread_rng().gen_range(0..(1i64 << 31)),
    };
    params.insert("input_seed".to_string(), serde_json::json!(next));
}

pub struct RerunInput<'a> {
    pub ancestor: &'a GenerationRecord,
    pub tool: &'a ToolDefinition,
    pub master_account_id: &'a str,
    /// Explicit user preferences to merge under the mutated payload — the
    /// mutated/explicit values win over preference defaults (§4.5).
    pub preferences: Option<HashMap<String, serde_json::Value>>,
}

fn build_metadata(input: &RerunInput<'_>) -> GenerationMetadata {
    let ancestor_meta = &input.ancestor.metadata;
    GenerationMetadata {
        telegram_message_id: ancestor_meta.telegram_message_id.clone(),
        telegram_chat_id: ancestor_meta.telegram_chat_id.clone(),
        platform_context: ancestor_meta.platform_context.clone(),
        // Full notification context points at the ancestor's originating
        // message, not the button press location (§4.5).
        notification_context: NotificationContext {
            chat_id: ancestor_meta
                .notification_context
                .chat_id
                .clone()
                .or_else(|| ancestor_meta.telegram_chat_id.clone()),
            message_id: ancestor_meta
                .notification_context
                .message_id
                .clone()
                .or_else(|| ancestor_meta.telegram_message_id.clone()),
            reply_to_message_id: ancestor_meta.notification_context.reply_to_message_id.clone(),
        },
        user_input_prompt: ancestor_meta.user_input_prompt.clone(),
        parent_generation_id: Some(input.ancestor.id.clone()),
        is_rerun: true,
        is_tweaked: false,
        rerun_count: ancestor_meta.rerun_count + 1,
        is_spell: false,
        spell_name: None,
        step_generation_ids: Vec::new(),
        deployment_id: ancestor_meta.deployment_id.clone(),
        workflow_id: ancestor_meta.workflow_id.clone(),
        run_id: None,
        initiating_event_id: Some(uuid::Uuid::new_v4().to_string()),
        status_reason: None,
    }
}

/// Merge preferences under the explicit (mutated) payload: explicit values
/// always win (§4.5 "the explicit payload values win").
fn merge_inputs(
    tool: &ToolDefinition,
    explicit: &HashMap<String, serde_json::Value>,
    preferences: Option<&HashMap<String, serde_json::Value>>,
) -> HashMap<String, serde_json::Value> {
    let mut merged: HashMap<String, serde_json::Value> = HashMap::new();
    if let Some(prefs) = preferences {
        for (k, v) in prefs {
            if tool.input_schema.contains_key(k.as_str()) {
                merged.insert(k.clone(), v.clone());
            }
        }
    }
    for (k, v) in explicit {
        if !k.starts_with("__") && tool.input_schema.contains_key(k.as_str()) {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}

/// Submit a rerun as a new execution request. Returns the new generation id.
pub async fn apply(client: &DataApiClient, input: RerunInput<'_>) -> Result<String> {
    let mut params = input.ancestor.request_payload.clone();
    mutate_seed(&mut params);

    if let Err(e) = client
        .log_event(&LogEventRequest {
            event_type: "rerun_clicked",
            master_account_id: input.master_account_id,
            payload: serde_json::json!({ "ancestor_generation_id": input.ancestor.id }),
        })
        .await
    {
        warn!(error = %e, "failed to log rerun_clicked event");
    }

    let inputs = merge_inputs(input.tool, &params, input.preferences.as_ref());
    let metadata = build_metadata(&input);
    let event_id = metadata
        .initiating_event_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let resp = client
        .execute_tool(&input.tool.tool_id, inputs, input.master_account_id, &event_id, &metadata)
        .await?;

    Ok(resp.generation_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutate_seed_increments_numeric_seed() {
        let mut params = HashMap::new();
        params.insert("input_seed".to_string(), serde_json::json!(100));
        mutate_seed(&mut params);
        assert_eq!(params["input_seed"], serde_json::json!(101));
    }

    #[test]
    fn mutate_seed_generates_fresh_value_when_missing() {
        let mut params = HashMap::new();
        mutate_seed(&mut params);
        let seed = params["input_seed"].as_i64().unwrap();
        assert!((0..(1i64 << 31)).contains(&seed));
    }

    #[test]
    fn mutate_seed_replaces_non_numeric_seed() {
        let mut params = HashMap::new();
        params.insert("input_seed".to_string(), serde_json::json!("random"));
        mutate_seed(&mut params);
        assert!(params["input_seed"].as_i64().is_some());
    }
}
