use async_trait::async_trait;
use serde_json::Value;

use crate::tool::Tool;

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file, creating missing parent directories"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file to write"},
                "content": {"type": "string", "description": "Content to write"}
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: Value) -> String {
        let Some(path) = args.get("path").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: path".to_string();
        };
        let Some(content) = args.get("content").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: content".to_string();
        };

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return format!("Error: {e}");
                }
            }
        }

        match tokio::fs::write(path, content).await {
            Ok(()) => format!("Successfully wrote {} bytes to {path}", content.len()),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_file_and_reports_byte_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let tool = WriteFileTool;
        let result = tool
            .execute(serde_json::json!({"path": path.to_str().unwrap(), "content": "hello"}))
            .await;
        assert_eq!(result, format!("Successfully wrote 5 bytes to {}", path.display()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("out.txt");

        let tool = WriteFileTool;
        let result = tool
            .execute(serde_json::json!({"path": path.to_str().unwrap(), "content": "x"}))
            .await;
        assert!(result.starts_with("Successfully wrote"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn missing_content_arg_returns_error() {
        let tool = WriteFileTool;
        let result = tool.execute(serde_json::json!({"path": "/tmp/x"})).await;
        assert!(result.starts_with("Error"));
    }
}
