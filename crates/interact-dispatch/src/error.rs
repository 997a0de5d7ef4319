use thiserror::Error;

/// §7 error taxonomy, dispatcher-level. Handlers catch and surface these;
/// they never re-throw across the dispatcher boundary (§7 "Propagation policy").
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("couldn't identify your account")]
    IdentityFailure,

    #[error("ancestor generation not found")]
    AncestorMissing,

    #[error("no reply context for this message")]
    ContextLoss,

    #[error("tweak session expired or was never created")]
    SessionLoss,

    #[error("{0}")]
    Validation(String),

    #[error("this menu isn't for you")]
    Unauthorized,

    #[error("execution submission failed: {0}")]
    ExecutionFailed(#[from] interact_execute::ExecuteError),

    #[error("state error: {0}")]
    State(#[from] interact_state::StateError),

    /// Any other data-API call failing mid-handler (preferences, usage
    /// ranking, tool listing, …) — distinct from [`DispatchError::IdentityFailure`],
    /// which is reserved for the C1 identity-resolution step itself.
    #[error("data API error: {0}")]
    DataApi(#[from] interact_data::DataApiError),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::IdentityFailure => "IDENTITY_FAILURE",
            DispatchError::AncestorMissing => "ANCESTOR_MISSING",
            DispatchError::ContextLoss => "CONTEXT_LOSS",
            DispatchError::SessionLoss => "SESSION_LOSS",
            DispatchError::Validation(_) => "VALIDATION_FAILURE",
            DispatchError::Unauthorized => "UNAUTHORIZED",
            DispatchError::ExecutionFailed(_) => "EXECUTION_FAILED",
            DispatchError::State(_) => "STATE_ERROR",
            DispatchError::DataApi(_) => "DATA_API_ERROR",
        }
    }

    /// User-facing ephemeral acknowledgement text (§7).
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::IdentityFailure => "Couldn't identify your account.".to_string(),
            DispatchError::AncestorMissing => "That generation could no longer be found.".to_string(),
            DispatchError::ContextLoss | DispatchError::SessionLoss => {
                "This has expired. Please try again.".to_string()
            }
            DispatchError::Validation(msg) => msg.clone(),
            DispatchError::Unauthorized => "This menu isn't for you.".to_string(),
            DispatchError::ExecutionFailed(_) => "Something went wrong submitting that.".to_string(),
            DispatchError::State(_) => "Something went wrong. Please try again.".to_string(),
            DispatchError::DataApi(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
