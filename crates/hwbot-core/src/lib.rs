pub mod client;
pub mod config;
pub mod error;
pub mod notifier;
pub mod orchestrator;
pub mod status;
pub mod types;
pub mod validate;

pub use error::{Result, WatchError};
