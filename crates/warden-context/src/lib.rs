pub mod builder;
pub mod error;

pub use builder::{add_assistant_message, add_tool_result, ContextBuilder};
pub use error::ContextError;
