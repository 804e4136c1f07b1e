use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("message bus has been stopped")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, BusError>;
