use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("no reply context for this message")]
    ReplyContextNotFound,

    #[error("tweak session expired or was never created")]
    TweakSessionNotFound,

    #[error("callback token is unknown or expired")]
    TokenNotFound,

    #[error("callback-data payload exceeds the 64-byte platform limit ({0} bytes)")]
    CallbackDataTooLong(usize),
}

impl StateError {
    pub fn code(&self) -> &'static str {
        match self {
            StateError::ReplyContextNotFound => "REPLY_CONTEXT_NOT_FOUND",
            StateError::TweakSessionNotFound => "TWEAK_SESSION_NOT_FOUND",
            StateError::TokenNotFound => "TOKEN_NOT_FOUND",
            StateError::CallbackDataTooLong(_) => "CALLBACK_DATA_TOO_LONG",
        }
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
