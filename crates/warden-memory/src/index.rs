use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{MemoryError, Result};
use crate::types::SearchResult;

const SNIPPET_RADIUS: usize = 100;
const SNIPPET_MAX_LEN: usize = 200;

/// Lowercase and split on non-alphanumeric boundaries.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

struct IndexedFile {
    path: PathBuf,
    content: String,
    term_freq: HashMap<String, usize>,
}

/// Rebuild-on-demand token→postings index over every `.md` file directly
/// under a memory directory. Not persisted; callers never hold references
/// across rebuilds.
pub struct MemoryIndex {
    files: Vec<IndexedFile>,
    doc_freq: HashMap<String, usize>,
}

impl MemoryIndex {
    pub fn build(memory_dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(memory_dir).map_err(|e| MemoryError::Io {
            path: memory_dir.display().to_string(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let mut term_freq = HashMap::new();
            for token in tokenize(&content) {
                *term_freq.entry(token).or_insert(0) += 1;
            }
            files.push(IndexedFile { path, content, term_freq });
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for file in &files {
            for token in file.term_freq.keys() {
                *doc_freq.entry(token.clone()).or_insert(0) += 1;
            }
        }

        Ok(Self { files, doc_freq })
    }

    /// Total token occurrences across every indexed file.
    pub fn total_tokens(&self) -> usize {
        self.files.iter().map(|f| f.term_freq.values().sum::<usize>()).sum()
    }

    /// Top `max_results` files by `Σ tf * log(1 + N/df)` over query tokens.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let query_tokens = tokenize(query);
        let n = self.files.len() as f64;

        let mut scored: Vec<(f64, &IndexedFile)> = self
            .files
            .iter()
            .filter_map(|file| {
                let score: f64 = query_tokens
                    .iter()
                    .map(|token| {
                        let tf = *file.term_freq.get(token).unwrap_or(&0) as f64;
                        let df = *self.doc_freq.get(token).unwrap_or(&0) as f64;
                        if tf == 0.0 || df == 0.0 {
                            0.0
                        } else {
                            tf * (1.0 + n / df).ln()
                        }
                    })
                    .sum();
                (score > 0.0).then_some((score, file))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(max_results)
            .map(|(score, file)| SearchResult {
                file: file.path.display().to_string(),
                snippet: snippet(&file.content, &query_tokens),
                score,
            })
            .collect()
    }
}

/// Up to 200 chars centred on the first matched-token occurrence.
fn snippet(content: &str, query_tokens: &[String]) -> String {
    let lower = content.to_lowercase();
    let first_match = query_tokens
        .iter()
        .filter_map(|t| lower.find(t.as_str()))
        .min();

    let Some(byte_pos) = first_match else {
        return content.chars().take(SNIPPET_MAX_LEN).collect();
    };
    // Convert the byte offset from `find` into a char index before windowing,
    // so the slice below never lands inside a multi-byte character.
    let char_pos = content[..byte_pos].chars().count();

    let start = char_pos.saturating_sub(SNIPPET_RADIUS);
    content.chars().skip(start).take(SNIPPET_MAX_LEN).collect()
}
