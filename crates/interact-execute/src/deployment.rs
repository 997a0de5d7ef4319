//! Deployment-id resolution for derived generations (§9 open question).
//!
//! The original rerun path sometimes reads `metadata.deploymentId` and
//! falls back to `workflowId` with a `comfy-` prefix stripped. Whether that
//! stripping is still required after all records migrated is ambiguous;
//! this core preserves the behavior behind `MigrationConfig::strip_comfy_prefix`
//! rather than guessing it is safe to drop (DESIGN.md records the decision).

const COMFY_PREFIX: &str = "comfy-";

/// Resolve the deployment id to carry forward onto a derived generation's
/// metadata: prefer `deployment_id` verbatim; otherwise derive it from
/// `workflow_id`, stripping the legacy `comfy-` prefix when `strip_comfy_prefix`
/// is enabled.
pub fn resolve_deployment_id(
    deployment_id: Option<&str>,
    workflow_id: Option<&str>,
    strip_comfy_prefix: bool,
) -> Option<String> {
    if let Some(id) = deployment_id {
        return Some(id.to_string());
    }
    let workflow_id = workflow_id?;
    if strip_comfy_prefix {
        Some(
            workflow_id
                .strip_prefix(COMFY_PREFIX)
                .unwrap_or(workflow_id)
                .to_string(),
        )
    } else {
        Some(workflow_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_explicit_deployment_id() {
        assert_eq!(
            resolve_deployment_id(Some("dep-1"), Some("comfy-dep-2"), true),
            Some("dep-1".to_string())
        );
    }

    #[test]
    fn strips_comfy_prefix_when_enabled() {
        assert_eq!(
            resolve_deployment_id(None, Some("comfy-flux-dev"), true),
            Some("flux-dev".to_string())
        );
    }

    #[test]
    fn keeps_workflow_id_verbatim_when_stripping_disabled() {
        assert_eq!(
            resolve_deployment_id(None, Some("comfy-flux-dev"), false),
            Some("comfy-flux-dev".to_string())
        );
    }

    #[test]
    fn none_when_both_absent() {
        assert_eq!(resolve_deployment_id(None, None, true), None);
    }
}
