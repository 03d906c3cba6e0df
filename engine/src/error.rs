use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the engine. Lookup misses are not errors: they are
/// `Option::None` at the call site and resolve to a zero contribution.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The cache file exists but does not hold a valid finalized index.
    #[error("malformed cache {path:?}: {reason}")]
    MalformedCache { path: PathBuf, reason: String },

    /// The source collection could not be parsed.
    #[error("malformed source {path:?}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },

    #[error("invalid scoring config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
