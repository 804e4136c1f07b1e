pub mod config;
pub mod error;
pub mod logging;
pub mod message;

pub use config::WorkspaceConfig;
pub use error::ConfigError;
pub use message::{InboundMessage, OutboundMessage};
