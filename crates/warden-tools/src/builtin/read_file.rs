use async_trait::async_trait;
use serde_json::Value;

use crate::tool::Tool;

pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file as UTF-8 text"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file to read"}
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value) -> String {
        let Some(path) = args.get("path").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: path".to_string();
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Error: File not found: {path}")
            }
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let tool = ReadFileTool;
        let result = tool.execute(serde_json::json!({"path": path.to_str().unwrap()})).await;
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn missing_file_returns_not_found_error() {
        let tool = ReadFileTool;
        let result = tool.execute(serde_json::json!({"path": "/nonexistent/path/a.txt"})).await;
        assert!(result.starts_with("Error: File not found"));
    }

    #[tokio::test]
    async fn missing_path_arg_returns_error() {
        let tool = ReadFileTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(result.starts_with("Error"));
    }
}
