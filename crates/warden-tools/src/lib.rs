pub mod builtin;
pub mod registry;
pub mod tool;

pub use builtin::{EditFileTool, ExecTool, ListDirTool, ReadFileTool, WriteFileTool};
pub use registry::ToolRegistry;
pub use tool::Tool;

/// A registry pre-populated with the five built-in tools, using
/// `exec_timeout_secs` for the `exec` tool's overall timeout.
pub fn default_registry(exec_timeout_secs: u64) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ReadFileTool));
    registry.register(Box::new(WriteFileTool));
    registry.register(Box::new(EditFileTool));
    registry.register(Box::new(ListDirTool));
    registry.register(Box::new(ExecTool::new(exec_timeout_secs)));
    registry
}
