use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
