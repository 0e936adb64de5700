use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a rule catalog. Catalog
/// failures are fatal to the caller; they are never downgraded to an empty
/// rule set.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog path does not exist: {0}")]
    MissingPath(String),
    #[error("failed to read catalog from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog from {path}: {message}")]
    Parse { path: String, message: String },
    #[error("duplicate rule title: {title}")]
    DuplicateTitle { title: String },
    #[error("rule at position {index} has an empty title")]
    EmptyTitle { index: usize },
}

impl CatalogError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CatalogError::Parse {
            path: path.into().display().to_string(),
            message: message.into(),
        }
    }
}
