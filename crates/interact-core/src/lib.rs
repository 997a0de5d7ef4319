pub mod config;
pub mod error;
pub mod keyboard;
pub mod outbound;
pub mod paramvalue;
pub mod safety;
pub mod types;
