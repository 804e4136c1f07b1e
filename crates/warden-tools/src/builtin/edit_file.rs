use async_trait::async_trait;
use serde_json::Value;

use crate::tool::Tool;

pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Replace occurrences of old_text with new_text in a file"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file to edit"},
                "old_text": {"type": "string", "description": "Text to find and replace"},
                "new_text": {"type": "string", "description": "Replacement text"}
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    async fn execute(&self, args: Value) -> String {
        let Some(path) = args.get("path").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: path".to_string();
        };
        let Some(old_text) = args.get("old_text").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: old_text".to_string();
        };
        let Some(new_text) = args.get("new_text").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: new_text".to_string();
        };

        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return format!("Error: File not found: {path}");
            }
            Err(e) => return format!("Error: {e}"),
        };

        let occurrences = content.matches(old_text).count();
        if occurrences == 0 {
            return "Error: old_text not found".to_string();
        }

        let replaced = content.replace(old_text, new_text);
        if let Err(e) = tokio::fs::write(path, replaced).await {
            return format!("Error: {e}");
        }

        if occurrences == 1 {
            format!("Successfully edited {path}")
        } else {
            format!("Warning: replaced {occurrences} times in {path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_occurrence_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello world").unwrap();

        let tool = EditFileTool;
        let result = tool
            .execute(serde_json::json!({
                "path": path.to_str().unwrap(),
                "old_text": "world",
                "new_text": "there"
            }))
            .await;
        assert!(result.starts_with("Successfully edited"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello there");
    }

    #[tokio::test]
    async fn multiple_occurrences_replaces_all_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "foo foo foo").unwrap();

        let tool = EditFileTool;
        let result = tool
            .execute(serde_json::json!({
                "path": path.to_str().unwrap(),
                "old_text": "foo",
                "new_text": "bar"
            }))
            .await;
        assert!(result.contains("Warning"));
        assert!(result.contains("3 times"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "bar bar bar");
    }

    #[tokio::test]
    async fn zero_occurrences_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello world").unwrap();

        let tool = EditFileTool;
        let result = tool
            .execute(serde_json::json!({
                "path": path.to_str().unwrap(),
                "old_text": "missing",
                "new_text": "x"
            }))
            .await;
        assert_eq!(result, "Error: old_text not found");
    }

    #[tokio::test]
    async fn missing_file_returns_error() {
        let tool = EditFileTool;
        let result = tool
            .execute(serde_json::json!({
                "path": "/nonexistent/a.txt",
                "old_text": "x",
                "new_text": "y"
            }))
            .await;
        assert!(result.starts_with("Error"));
    }
}
