//! Telegram platform adapter: a [`ChatTransport`](interact_dispatch::ChatTransport)
//! implementation over `teloxide`, plus the long-polling event loop that
//! translates updates into the platform-agnostic event model (§2, §4.11, §6).

pub mod adapter;
pub mod error;
pub mod keyboard;
pub mod transport;

pub use error::TelegramError;
pub use transport::TelegramTransport;
