use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("ancestor generation not found")]
    AncestorMissing,

    #[error("tool not found for ancestor's display name")]
    ToolMissing,

    #[error("data API error: {0}")]
    DataApi(#[from] interact_data::DataApiError),
}

impl ExecuteError {
    pub fn code(&self) -> &'static str {
        match self {
            ExecuteError::AncestorMissing => "ANCESTOR_MISSING",
            ExecuteError::ToolMissing => "TOOL_MISSING",
            ExecuteError::DataApi(_) => "DATA_API_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecuteError>;
