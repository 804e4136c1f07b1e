mod edit_file;
mod exec;
mod list_dir;
mod read_file;
mod write_file;

pub use edit_file::EditFileTool;
pub use exec::ExecTool;
pub use list_dir::ListDirTool;
pub use read_file::ReadFileTool;
pub use write_file::WriteFileTool;
