use serde::Serialize;

/// One discovered `<workspace>/skills/<name>/SKILL.md` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillInfo {
    pub name: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
