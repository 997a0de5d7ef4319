//! Discord platform adapter: a [`ChatTransport`](interact_dispatch::ChatTransport)
//! implementation over `serenity`, plus the gateway event loop that
//! translates events into the platform-agnostic event model (§2, §4.11, §6),
//! mirrored from [`interact_telegram`]'s long-polling counterpart.

pub mod adapter;
pub mod error;
pub mod keyboard;
pub mod transport;

pub use error::DiscordError;
pub use transport::DiscordTransport;
