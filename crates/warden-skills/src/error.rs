use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillsError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SkillsError>;
