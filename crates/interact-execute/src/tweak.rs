//! Tweak-apply submission (§4.4 step 4).

use std::collections::HashMap;

use interact_core::types::{GenerationMetadata, GenerationRecord, NotificationContext, ToolDefinition};
use interact_data::DataApiClient;
use interact_data::types::LogEventRequest;
use tracing::warn;

use crate::error::Result;

/// Everything the caller has assembled by the time `tweak_apply:<token>`
/// is pressed: the overlaid parameter draft and the menu's current location.
pub struct TweakApplyInput<'a> {
    pub ancestor: &'a GenerationRecord,
    pub tool: &'a ToolDefinition,
    pub params: &'a HashMap<String, serde_json::Value>,
    pub master_account_id: &'a str,
    pub menu_chat_id: &'a str,
    pub menu_msg_id: &'a str,
}

/// Filter `params` down to keys declared in `inputSchema`, per invariant 2
/// (§8): no key absent from the schema, and no `__`-prefixed bookkeeping
/// field, ever reaches the execution request.
pub fn filtered_inputs(
    tool: &ToolDefinition,
    params: &HashMap<String, serde_json::Value>,
) -> HashMap<String, serde_json::Value> {
    params
        .iter()
        .filter(|(k, _)| !k.starts_with("__") && tool.input_schema.contains_key(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn build_metadata(input: &TweakApplyInput<'_>, event_id: &str) -> GenerationMetadata {
    let ancestor_meta = &input.ancestor.metadata;

    let notification_context = if ancestor_meta.notification_context.chat_id.is_some() {
        ancestor_meta.notification_context.clone()
    } else {
        NotificationContext {
            chat_id: Some(input.menu_chat_id.to_string()),
            message_id: Some(input.menu_msg_id.to_string()),
            reply_to_message_id: None,
        }
    };

    let user_input_prompt = input
        .params
        .get("input_prompt")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| ancestor_meta.user_input_prompt.clone());

    GenerationMetadata {
        telegram_message_id: ancestor_meta.telegram_message_id.clone(),
        telegram_chat_id: ancestor_meta.telegram_chat_id.clone(),
        platform_context: ancestor_meta.platform_context.clone(),
        notification_context,
        user_input_prompt,
        parent_generation_id: Some(input.ancestor.id.clone()),
        is_rerun: false,
        is_tweaked: true,
        rerun_count: ancestor_meta.rerun_count,
        is_spell: false,
        spell_name: None,
        step_generation_ids: Vec::new(),
        deployment_id: ancestor_meta.deployment_id.clone(),
        workflow_id: ancestor_meta.workflow_id.clone(),
        run_id: None,
        initiating_event_id: Some(
            ancestor_meta
                .initiating_event_id
                .clone()
                .unwrap_or_else(|| event_id.to_string()),
        ),
        status_reason: None,
    }
}

/// Submit a tweak-apply as a new execution request. Returns the new
/// generation id on success. Logs `tweak_submitted` best-effort (§4.4,
/// §7 "Best-effort operations").
pub async fn apply(client: &DataApiClient, input: TweakApplyInput<'_>) -> Result<String> {
    let event_id = uuid::Uuid::new_v4().to_string();
    let inputs = filtered_inputs(input.tool, input.params);
    let metadata = build_metadata(&input, &event_id);

    if let Err(e) = client
        .log_event(&LogEventRequest {
            event_type: "tweak_submitted",
            master_account_id: input.master_account_id,
            payload: serde_json::json!({ "ancestor_generation_id": input.ancestor.id }),
        })
        .await
    {
        warn!(error = %e, "failed to log tweak_submitted event");
    }

    let resp = client
        .execute_tool(
            &input.tool.tool_id,
            inputs,
            input.master_account_id,
            &event_id,
            &metadata,
        )
        .await?;

    Ok(resp.generation_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_core::types::{ParamSchema, ParamType};

    fn sample_tool() -> ToolDefinition {
        let mut input_schema = HashMap::new();
        input_schema.insert(
            "input_prompt".to_string(),
            ParamSchema {
                param_type: ParamType::String,
                default: None,
                description: None,
            },
        );
        input_schema.insert(
            "input_steps".to_string(),
            ParamSchema {
                param_type: ParamType::Integer,
                default: None,
                description: None,
            },
        );
        ToolDefinition {
            tool_id: "img-quick".to_string(),
            display_name: "Quick Image".to_string(),
            description: None,
            input_schema,
            metadata: Default::default(),
            delivery_mode: interact_core::types::DeliveryMode::Immediate,
        }
    }

    #[test]
    fn filtered_inputs_drops_dunder_and_unknown_keys() {
        let tool = sample_tool();
        let mut params = HashMap::new();
        params.insert("input_prompt".to_string(), serde_json::json!("a cat"));
        params.insert("input_steps".to_string(), serde_json::json!(30));
        params.insert("__canonicalToolId__".to_string(), serde_json::json!("img-quick"));
        params.insert("unrelated_key".to_string(), serde_json::json!(1));

        let filtered = filtered_inputs(&tool, &params);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.contains_key("input_prompt"));
        assert!(filtered.contains_key("input_steps"));
        assert!(!filtered.contains_key("__canonicalToolId__"));
        assert!(!filtered.contains_key("unrelated_key"));
    }
}
