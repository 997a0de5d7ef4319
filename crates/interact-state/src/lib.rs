pub mod error;
pub mod reaper;
pub mod reply_context;
pub mod tokens;
pub mod tweak_session;

pub use error::{Result, StateError};
pub use reply_context::{ReplyContext, ReplyContextStore};
pub use tokens::TokenMap;
pub use tweak_session::{session_key, TweakSession, TweakSessionStore};
