//! Derived-generation dispatcher (C7): constructs and submits new execution
//! requests for tweak-apply and rerun, carrying ancestor linkage and
//! original chat context (§4.4 step 4, §4.5).

pub mod deployment;
pub mod error;
pub mod rerun;
pub mod tweak;

pub use error::{ExecuteError, Result};

use interact_data::DataApiClient;
use tracing::warn;

/// Mark a nascent generation `failed` with `statusReason` after a submission
/// error (§7 "Execution-service submission failure"). Best-effort: a
/// failure here is logged, not propagated, since the user already sees the
/// original error.
pub async fn mark_failed(client: &DataApiClient, generation_id: &str, reason: &str) {
    let patch = serde_json::json!({
        "status": "failed",
        "metadata": { "statusReason": reason },
    });
    if let Err(e) = client.patch_generation(generation_id, patch).await {
        warn!(error = %e, generation_id, "failed to mark generation as failed");
    }
}
