//! Error types for insight-fs

use std::path::PathBuf;

/// Result type for insight-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in insight-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot scan {path}: {message}")]
    Scan { path: PathBuf, message: String },

    #[error("Sync failed at {path}: {message}")]
    Sync {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Refusing to write outside destination root: {path}")]
    UnsafePath { path: PathBuf },

    #[error("Corrupt compressed stream: {message}")]
    CorruptStream { message: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn sync(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Sync {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }
}
