use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),

    #[error("bot token rejected during startup validation: {0}")]
    InvalidToken(String),
}
