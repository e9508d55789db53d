//! Document storage abstraction.
//!
//! [`DocumentStorage`] is what a deployment consumes: upload a local file
//! into a library folder, or download a library file into a local directory.
//! [`SharePointClient`](crate::SharePointClient) talks to a real site;
//! [`MemoryDocumentLibrary`](crate::fakes::MemoryDocumentLibrary) backs tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::StorageResult;
use crate::site::SiteUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transfer {
    Upload,
    Download,
}

/// Outcome of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub direction: Transfer,
    /// Server-relative path of the remote file
    pub remote_path: String,
    /// Source (upload) or written file (download)
    pub local_path: PathBuf,
    pub bytes: u64,
    /// SHA-256 of the transferred content, lowercase hex
    pub sha256: String,
}

impl TransferReceipt {
    pub fn new(
        direction: Transfer,
        remote_path: String,
        local_path: PathBuf,
        content: &[u8],
    ) -> Self {
        TransferReceipt {
            direction,
            remote_path,
            local_path,
            bytes: content.len() as u64,
            sha256: sha256_hex(content),
        }
    }

    /// Status word reported back to callers.
    pub fn status(&self) -> &'static str {
        match self.direction {
            Transfer::Upload => "uploaded",
            Transfer::Download => "downloaded",
        }
    }
}

pub(crate) fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// File storage consumed by deployments.
///
/// Implementations bound every call with their own timeout and must be safe
/// to share between concurrent requests.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Upload `local_path` as `folder/file_name` in the site's library,
    /// replacing any existing file.
    async fn upload(
        &self,
        local_path: &Path,
        folder: &str,
        file_name: &str,
        site: &SiteUrl,
    ) -> StorageResult<TransferReceipt>;

    /// Download `folder/file_name` into `sink_dir/file_name`.
    async fn download(
        &self,
        folder: &str,
        file_name: &str,
        site: &SiteUrl,
        sink_dir: &Path,
    ) -> StorageResult<TransferReceipt>;
}
