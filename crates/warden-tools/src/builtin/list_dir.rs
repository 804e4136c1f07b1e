use async_trait::async_trait;
use serde_json::Value;

use crate::tool::Tool;

pub struct ListDirTool;

#[async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &str {
        "list_dir"
    }

    fn description(&self) -> &str {
        "List the contents of a directory"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Directory to list"}
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value) -> String {
        let Some(path) = args.get("path").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: path".to_string();
        };

        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return format!("Error: directory not found: {path}");
            }
            Err(e) => return format!("Error: {e}"),
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                    names.push(if is_dir { format!("{name}/") } else { name });
                }
                Ok(None) => break,
                Err(e) => return format!("Error: {e}"),
            }
        }

        if names.is_empty() {
            return format!("{path} is empty");
        }
        names.sort();
        names.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let tool = ListDirTool;
        let result = tool.execute(serde_json::json!({"path": dir.path().to_str().unwrap()})).await;
        assert!(result.contains("a.txt"));
        assert!(result.contains("sub/"));
    }

    #[tokio::test]
    async fn empty_directory_reports_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ListDirTool;
        let result = tool.execute(serde_json::json!({"path": dir.path().to_str().unwrap()})).await;
        assert!(result.contains("empty"));
    }

    #[tokio::test]
    async fn nonexistent_path_returns_error() {
        let tool = ListDirTool;
        let result = tool.execute(serde_json::json!({"path": "/nonexistent/dir"})).await;
        assert!(result.starts_with("Error"));
    }
}
