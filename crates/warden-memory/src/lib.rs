pub mod error;
mod index;
pub mod store;
pub mod types;

pub use error::MemoryError;
pub use store::MemoryStore;
pub use types::SearchResult;

use std::path::Path;

/// Rebuilds an index over `<workspace>/memory/` and returns the top
/// `max_results` matches for `query`, ranked by `tf * log(1 + N/df)`.
pub fn search_memory(workspace: impl AsRef<Path>, query: &str, max_results: usize) -> error::Result<Vec<SearchResult>> {
    let memory_dir = workspace.as_ref().join("memory");
    let index = index::MemoryIndex::build(&memory_dir)?;
    Ok(index.search(query, max_results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_memory_finds_match_across_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path()).unwrap();
        store.write_long_term("remember to deploy to production on Friday").unwrap();

        let results = search_memory(dir.path(), "deploy production", 3).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].file.contains("MEMORY.md"));
    }
}
