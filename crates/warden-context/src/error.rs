use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Memory(#[from] warden_memory::MemoryError),
    #[error(transparent)]
    Skills(#[from] warden_skills::SkillsError),
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ContextError>;
