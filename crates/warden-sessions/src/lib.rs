pub mod error;
pub mod manager;
pub mod types;

pub use error::SessionError;
pub use manager::{SessionManager, SessionSummary};
pub use types::{sanitize_key, ChatTurn, Session};
