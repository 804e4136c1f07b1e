pub mod bus;
pub mod error;
mod queue;

pub use bus::MessageBus;
pub use error::BusError;
