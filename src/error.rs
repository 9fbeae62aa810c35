//! Error types for the processing core.
//!
//! The library returns [`DocragError`]; the `docrag` binary wraps it in
//! `anyhow` with extra context at the command boundary.

use std::path::PathBuf;

/// Errors produced by chunking, assembly, extraction, and output writing.
#[derive(Debug, thiserror::Error)]
pub enum DocragError {
    /// Rejected configuration (e.g. `chunk_size <= overlap`).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A chunk violates the caller contract (e.g. empty `metadata.source`).
    #[error("invalid chunk: {0}")]
    InvalidChunk(String),

    /// Text extraction failed for a source document.
    #[error("extraction failed for {path:?}: {message}")]
    Extract { path: PathBuf, message: String },

    /// Filesystem I/O error with the offending path.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON (de)serialization error with the offending path.
    #[error("JSON error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, DocragError>;

impl DocragError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_chunk(msg: impl Into<String>) -> Self {
        Self::InvalidChunk(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocragError::invalid_config("chunk_size must exceed overlap");
        assert_eq!(
            err.to_string(),
            "invalid config: chunk_size must exceed overlap"
        );

        let err = DocragError::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("missing.json"));
    }
}
