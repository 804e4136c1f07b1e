use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SkillsError};
use crate::types::SkillInfo;

const SOURCE: &str = "workspace";

fn io_err(path: &Path, source: std::io::Error) -> SkillsError {
    SkillsError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Discovers and loads `SKILL.md` documents under `<workspace>/skills/`.
pub struct SkillsLoader {
    skills_dir: PathBuf,
}

impl SkillsLoader {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            skills_dir: workspace.into().join("skills"),
        }
    }

    /// Immediate subdirectories of `skills/` containing a `SKILL.md`. Empty,
    /// not an error, when the directory doesn't exist.
    pub fn list_skills(&self) -> Result<Vec<SkillInfo>> {
        let entries = match std::fs::read_dir(&self.skills_dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.skills_dir, e)),
        };

        let mut skills = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let skill_file = path.join("SKILL.md");
            if !skill_file.is_file() {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&skill_file) else {
                debug!(path = %skill_file.display(), "skipping skill: unreadable");
                continue;
            };
            let description = parse_frontmatter(&content).and_then(|m| m.get("description").cloned());
            skills.push(SkillInfo {
                name: name.to_string(),
                source: SOURCE.to_string(),
                description,
            });
        }
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    /// Full file contents (frontmatter included), or `None` if missing.
    pub fn load_skill(&self, name: &str) -> Option<String> {
        let path = self.skills_dir.join(name).join("SKILL.md");
        std::fs::read_to_string(path).ok()
    }

    /// Concatenates each named skill's contents, separated by `\n---\n`.
    /// Unknown names are silently skipped.
    pub fn load_skills_for_context(&self, names: &[String]) -> String {
        names
            .iter()
            .filter_map(|name| self.load_skill(name))
            .collect::<Vec<_>>()
            .join("\n---\n")
    }

    /// Frontmatter mapping for a skill, or `None` if missing or frontmatter-less.
    pub fn get_skill_metadata(&self, name: &str) -> Option<HashMap<String, String>> {
        let content = self.load_skill(name)?;
        parse_frontmatter(&content)
    }

    /// `<skills>\n<skill name="N" description="D"/>\n…\n</skills>`.
    pub fn build_skills_summary(&self) -> Result<String> {
        let skills = self.list_skills()?;
        let mut out = String::from("<skills>\n");
        for skill in &skills {
            out.push_str(&format!(
                "<skill name=\"{}\" description=\"{}\"/>\n",
                skill.name,
                skill.description.as_deref().unwrap_or("")
            ));
        }
        out.push_str("</skills>");
        Ok(out)
    }
}

/// Parses `key: value` lines between a leading and next `---` line. `None`
/// when the file doesn't start with `---` or the closing delimiter is
/// missing.
fn parse_frontmatter(content: &str) -> Option<HashMap<String, String>> {
    let mut lines = content.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }

    let mut map = HashMap::new();
    for line in lines {
        if line.trim() == "---" {
            return Some(map);
        }
        if let Some((key, value)) = line.split_once(':') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    None
}
