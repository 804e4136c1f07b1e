use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error for session {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file for {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error(
        "session key {key:?} sanitises to the same file as existing key {existing:?}; refusing to overwrite"
    )]
    KeyCollision { key: String, existing: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;
