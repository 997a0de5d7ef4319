pub mod client;
pub mod error;
pub mod identity;
pub mod tools;
pub mod types;

pub use client::DataApiClient;
pub use error::{DataApiError, Result};
pub use identity::{IdentityResolver, ResolvedIdentity};
pub use tools::ToolRegistry;
