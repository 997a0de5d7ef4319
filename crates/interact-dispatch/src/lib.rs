//! C4 Dispatchers + the shared `InteractionContext`/`ChatTransport` seam
//! every feature handler and platform adapter is built against (§4.0, §4.1).

pub mod auth;
pub mod context;
pub mod error;
pub mod event;
pub mod grammar;
pub mod registry;
pub mod transport;

pub use context::{InteractionContext, SharedContext};
pub use error::{DispatchError, Result};
pub use event::{IncomingCallback, IncomingCommand, IncomingReply, Sender};
pub use registry::{
    CallbackHandler, CommandHandler, CommandMatch, Dispatchers, DynamicCommandHandler,
    ReplyHandler,
};
pub use transport::{ChatTransport, MessageRef, TransportError};
