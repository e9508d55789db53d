//! Error types for sharepoint-bridge

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a document storage collaborator.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Site URL could not be built from the configured endpoint
    #[error("invalid SharePoint endpoint: {0}")]
    InvalidEndpoint(String),

    /// Folder or file name rejected before any I/O
    #[error("invalid remote path: {0}")]
    InvalidPath(String),

    /// Remote file does not exist
    #[error("remote file not found: {remote_path}")]
    NotFound { remote_path: String },

    /// Server answered with a non-success status
    #[error("SharePoint returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Local source file for an upload could not be read
    #[error("cannot read local file {}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a downloaded file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body did not have the expected shape
    #[error("unexpected SharePoint response: {0}")]
    Protocol(String),

    /// Storage refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Http(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;
