use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use warden_memory::MemoryStore;
use warden_sessions::ChatTurn;
use warden_skills::SkillsLoader;

use crate::error::{ContextError, Result};

const IDENTITY_HEADER: &str = "You are Warden, an autonomous agent operating inside a workspace.";

/// Assembles the model-facing system prompt and conversation turns from a
/// workspace's memory, skills, and bootstrap files.
pub struct ContextBuilder {
    workspace: PathBuf,
    memory: MemoryStore,
    skills: SkillsLoader,
}

impl ContextBuilder {
    pub fn new(workspace: impl Into<PathBuf>) -> Result<Self> {
        let workspace = workspace.into();
        let memory = MemoryStore::new(&workspace)?;
        let skills = SkillsLoader::new(&workspace);
        Ok(Self { workspace, memory, skills })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Identity header, current time, workspace path, bootstrap `.md` files,
    /// memory context, and skills summary, each section blank-line separated
    /// and omitted cleanly when empty.
    pub fn build_system_prompt(&self) -> Result<String> {
        let mut sections = vec![
            IDENTITY_HEADER.to_string(),
            format!("Current Time: {}", Utc::now().to_rfc3339()),
            format!("workspace: {}", self.workspace.display()),
        ];

        let bootstrap = self.build_bootstrap_section()?;
        if !bootstrap.is_empty() {
            sections.push(bootstrap);
        }

        let memory_ctx = self.memory.get_memory_context()?;
        if !memory_ctx.is_empty() {
            sections.push(format!("## Memory\n\n{memory_ctx}"));
        }

        let skills_summary = self.skills.build_skills_summary()?;
        sections.push(skills_summary);

        Ok(sections.join("\n\n"))
    }

    fn build_bootstrap_section(&self) -> Result<String> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.workspace)
            .map_err(|e| ContextError::Io {
                path: self.workspace.display().to_string(),
                source: e,
            })?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
            .collect();
        files.sort();

        let mut parts = Vec::new();
        for path in files {
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            parts.push(format!("## {name}\n{content}"));
        }
        Ok(parts.join("\n\n"))
    }

    /// `[system] + history + [user]`. `history` turns are forwarded
    /// verbatim.
    pub fn build_messages(&self, history: &[ChatTurn], user_text: &str) -> Result<Vec<ChatTurn>> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatTurn::System {
            content: self.build_system_prompt()?,
            extra: Default::default(),
        });
        messages.extend(history.iter().cloned());
        messages.push(ChatTurn::User {
            content: user_text.to_string(),
            extra: Default::default(),
        });
        Ok(messages)
    }
}

/// Appends a tool-result turn. Returns a new list; `messages` is untouched.
pub fn add_tool_result(
    messages: &[ChatTurn],
    call_id: impl Into<String>,
    tool_name: impl Into<String>,
    content: impl Into<String>,
) -> Vec<ChatTurn> {
    let mut out = messages.to_vec();
    out.push(ChatTurn::Tool {
        call_id: call_id.into(),
        name: tool_name.into(),
        content: content.into(),
        extra: Default::default(),
    });
    out
}

/// Appends an assistant turn, carrying `tool_calls` when provided. Returns a
/// new list; `messages` is untouched.
pub fn add_assistant_message(
    messages: &[ChatTurn],
    content: impl Into<String>,
    tool_calls: Option<Value>,
) -> Vec<ChatTurn> {
    let mut out = messages.to_vec();
    out.push(ChatTurn::Assistant {
        content: content.into(),
        tool_calls,
        extra: Default::default(),
    });
    out
}
