use thiserror::Error;

/// Errors surfaced by the data-API client and identity resolver. Kept
/// separate from `interact_core::error::CoreError` so dispatch can map
/// them to the §7 error taxonomy without coupling layers.
#[derive(Debug, Error)]
pub enum DataApiError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("data API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataApiError {
    pub fn code(&self) -> &'static str {
        match self {
            DataApiError::Request(_) => "REQUEST_ERROR",
            DataApiError::Api { .. } => "DATA_API_ERROR",
            DataApiError::Timeout { .. } => "TIMEOUT",
            DataApiError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// `true` for a 409 Conflict — the caller should show a friendly
    /// "pending request exists" message rather than a hard error (§7, §4.8).
    pub fn is_conflict(&self) -> bool {
        matches!(self, DataApiError::Api { status: 409, .. })
    }

    /// `true` for a 404 Not Found — several flows treat this as silent
    /// (§4.5 rerun preference merge, §7 "best-effort operations").
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataApiError::Api { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, DataApiError>;
