use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command as AsyncCommand;
use tracing::warn;

use crate::tool::Tool;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runs a shell command via `sh -c` with an overall timeout. No safety
/// filtering is attempted; callers own their trust boundary.
pub struct ExecTool {
    timeout_secs: u64,
}

impl ExecTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Default for ExecTool {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl Tool for ExecTool {
    fn name(&self) -> &str {
        "exec"
    }

    fn description(&self) -> &str {
        "Run a shell command and return its stdout/stderr/exit code"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "Shell command to run"},
                "working_dir": {"type": "string", "description": "Directory to run the command in"}
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: Value) -> String {
        let Some(command) = args.get("command").and_then(|v| v.as_str()) else {
            return "Error: missing required parameter: command".to_string();
        };
        let working_dir = args.get("working_dir").and_then(|v| v.as_str());

        let mut cmd = AsyncCommand::new("sh");
        cmd.arg("-c").arg(command);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => return format!("Error: {e}"),
        };

        let pid = child.id();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(child.wait_with_output().await);
        });

        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), rx).await {
            Ok(Ok(Ok(output))) => format_output(&output),
            Ok(Ok(Err(e))) => format!("Error: {e}"),
            Ok(Err(_)) => "Error: command wait task failed unexpectedly".to_string(),
            Err(_elapsed) => {
                if let Some(raw_pid) = pid {
                    #[cfg(unix)]
                    unsafe {
                        libc::kill(raw_pid as libc::pid_t, libc::SIGKILL);
                    }
                }
                warn!(command, timeout_secs = self.timeout_secs, "exec timed out");
                format!("Error: command timed out after {}s", self.timeout_secs)
            }
        }
    }
}

fn format_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let exit_code = output.status.code().unwrap_or(-1);

    let mut parts = vec![stdout.trim_end().to_string()];
    if !stderr.trim().is_empty() {
        parts.push(format!("STDERR:\n{}", stderr.trim_end()));
    }
    if exit_code != 0 {
        parts.push(format!("Exit code: {exit_code}"));
    }
    parts.join("\n")
}
