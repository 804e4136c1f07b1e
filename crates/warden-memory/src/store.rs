use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{MemoryError, Result};
use crate::index::MemoryIndex;

const DATE_FMT: &str = "%Y-%m-%d";

fn io_err(path: &Path, source: std::io::Error) -> MemoryError {
    MemoryError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Owns `<workspace>/memory/`: a dated daily note per day plus a single
/// long-term note, with a rebuild-on-demand search index over both.
pub struct MemoryStore {
    workspace: PathBuf,
    memory_dir: PathBuf,
}

impl MemoryStore {
    /// Ensures `<workspace>/memory/` exists.
    pub fn new(workspace: impl Into<PathBuf>) -> Result<Self> {
        let workspace = workspace.into();
        let memory_dir = workspace.join("memory");
        std::fs::create_dir_all(&memory_dir).map_err(|e| io_err(&memory_dir, e))?;
        Ok(Self { workspace, memory_dir })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn memory_dir(&self) -> &Path {
        &self.memory_dir
    }

    pub fn memory_file(&self) -> PathBuf {
        self.memory_dir.join("MEMORY.md")
    }

    pub fn get_today_file(&self) -> PathBuf {
        self.memory_dir.join(format!("{}.md", Utc::now().format(DATE_FMT)))
    }

    pub fn read_today(&self) -> Result<String> {
        read_or_empty(&self.get_today_file())
    }

    /// First write of the day prepends `# <today>\n\n`; every write appends
    /// `<text>\n`.
    pub fn append_today(&self, text: &str) -> Result<()> {
        let path = self.get_today_file();
        let existing = read_or_empty(&path)?;
        let mut body = existing;
        if body.is_empty() {
            body.push_str(&format!("# {}\n\n", Utc::now().format(DATE_FMT)));
        }
        body.push_str(text);
        body.push('\n');
        std::fs::write(&path, body).map_err(|e| io_err(&path, e))?;
        debug!(file = %path.display(), "appended to today's note");
        Ok(())
    }

    pub fn read_long_term(&self) -> Result<String> {
        read_or_empty(&self.memory_file())
    }

    /// Whole-file overwrite.
    pub fn write_long_term(&self, text: &str) -> Result<()> {
        let path = self.memory_file();
        std::fs::write(&path, text).map_err(|e| io_err(&path, e))?;
        info!(file = %path.display(), "wrote long-term memory");
        Ok(())
    }

    /// Concatenates, newest first, up to `days` dated files' contents with
    /// date headers.
    pub fn get_recent_memories(&self, days: usize) -> Result<String> {
        let files = self.list_memory_files()?;
        let mut out = String::new();
        for path in files.iter().take(days) {
            let content = read_or_empty(path)?;
            if content.trim().is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            let date = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            out.push_str(&format!("## {}\n{}", date, content));
        }
        Ok(out)
    }

    /// Dated files (`YYYY-MM-DD.md`) under `memory/`, newest first.
    pub fn list_memory_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.memory_dir)
            .map_err(|e| io_err(&self.memory_dir, e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_dated_note(p))
            .collect();
        files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(files)
    }

    /// Composite string: "Long-term Memory" section (if non-empty), a blank
    /// line, "Today's Notes" section (if non-empty). Empty if both are empty.
    pub fn get_memory_context(&self) -> Result<String> {
        let long_term = self.read_long_term()?;
        let today = self.read_today()?;

        let mut sections = Vec::new();
        if !long_term.trim().is_empty() {
            sections.push(format!("## Long-term Memory\n\n{}", long_term));
        }
        if !today.trim().is_empty() {
            sections.push(format!("## Today's Notes\n\n{}", today));
        }
        Ok(sections.join("\n\n"))
    }

    /// Rebuilds the in-memory search index from every file under `memory/`
    /// and returns the total token occurrences indexed.
    pub fn build_index(&self) -> Result<usize> {
        let index = MemoryIndex::build(&self.memory_dir)?;
        Ok(index.total_tokens())
    }
}

fn is_dated_note(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let bytes = name.as_bytes();
    name.ends_with(".md")
        && name.len() == 13 // YYYY-MM-DD.md
        && bytes[0..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

fn read_or_empty(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(io_err(path, e)),
    }
}
