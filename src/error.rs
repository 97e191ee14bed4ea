//! Error taxonomy for extraction and selection persistence
//!
//! Per-file problems never surface here as hard failures: they become
//! [`Diagnostic`] entries returned next to the successful results. The
//! variants below abort a single operation and leave the next step to the
//! caller.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the extraction pipeline and the selection store
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Bad root path or unusable configuration. Fatal before any extraction.
    #[error("Configuration error: {0}")]
    Config(String),

    /// One source file failed to parse. Recoverable; normally folded into a diagnostic.
    #[error("Failed to parse {file_path} at line {line}: {message}")]
    Parse {
        file_path: String,
        line: u32,
        message: String,
    },

    /// The persisted selection store is unreadable or malformed.
    ///
    /// Never resolved silently: the caller chooses between aborting and
    /// proceeding with an empty store via [`crate::selection::StoreRecovery`].
    #[error("Selection store {path} is corrupt: {detail}")]
    StoreCorruption { path: PathBuf, detail: String },

    /// Reading or writing the selection store failed at the filesystem level
    #[error("Selection store I/O error on {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another merge currently holds the store for mutation
    #[error("Selection store {0} is locked by another writer")]
    StoreLocked(PathBuf),

    /// Two nodes in one tree received the same stable id. Indicates a defect.
    #[error("Identity collision: stable id '{0}' assigned twice")]
    IdentityCollision(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// A recoverable, per-file problem surfaced alongside successful results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Relative Unix-style path when known, otherwise the raw path
    pub file_path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_path, self.message)
    }
}

impl From<&SurfaceError> for Diagnostic {
    fn from(err: &SurfaceError) -> Self {
        match err {
            SurfaceError::Parse { file_path, .. } => Diagnostic::new(file_path, err.to_string()),
            other => Diagnostic::new("<run>", other.to_string()),
        }
    }
}
