use serde::Serialize;

/// A single hit from `search_memory`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub file: String,
    pub snippet: String,
    pub score: f64,
}
