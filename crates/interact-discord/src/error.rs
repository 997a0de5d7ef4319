use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("discord API error: {0}")]
    Api(#[from] serenity::Error),

    #[error("bot token rejected during startup validation: {0}")]
    InvalidToken(String),
}
