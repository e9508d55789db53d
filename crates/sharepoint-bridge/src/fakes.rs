//! In-memory document library (testing only)
//!
//! `MemoryDocumentLibrary` satisfies the [`DocumentStorage`] contract without
//! any network: files are keyed by their server-relative path.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::site::{validate_file_name, validate_folder, SiteUrl};
use crate::storage::{DocumentStorage, Transfer, TransferReceipt};

#[derive(Debug, Default)]
pub struct MemoryDocumentLibrary {
    files: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<VecDeque<String>>,
}

impl MemoryDocumentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a remote file.
    pub fn insert(&self, site: &SiteUrl, folder: &str, file_name: &str, content: &[u8]) {
        let mut files = self.files.lock().unwrap();
        files.insert(site.file_path(folder, file_name), content.to_vec());
    }

    pub fn get(&self, site: &SiteUrl, folder: &str, file_name: &str) -> Option<Vec<u8>> {
        self.get_path(&site.file_path(folder, file_name))
    }

    /// Look up a file by server-relative path.
    pub fn get_path(&self, remote_path: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap();
        files.get(remote_path).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next operation fail with [`StorageError::Unavailable`].
    pub fn fail_next(&self, message: &str) {
        let mut failures = self.failures.lock().unwrap();
        failures.push_back(message.to_string());
    }

    fn take_failure(&self) -> StorageResult<()> {
        let mut failures = self.failures.lock().unwrap();
        match failures.pop_front() {
            Some(message) => Err(StorageError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStorage for MemoryDocumentLibrary {
    async fn upload(
        &self,
        local_path: &Path,
        folder: &str,
        file_name: &str,
        site: &SiteUrl,
    ) -> StorageResult<TransferReceipt> {
        validate_file_name(file_name)?;
        validate_folder(folder)?;
        let content = std::fs::read(local_path).map_err(|source| StorageError::LocalFile {
            path: local_path.to_path_buf(),
            source,
        })?;
        self.take_failure()?;

        let remote_path = site.file_path(folder, file_name);
        let receipt = TransferReceipt::new(
            Transfer::Upload,
            remote_path.clone(),
            local_path.to_path_buf(),
            &content,
        );
        self.files.lock().unwrap().insert(remote_path, content);
        Ok(receipt)
    }

    async fn download(
        &self,
        folder: &str,
        file_name: &str,
        site: &SiteUrl,
        sink_dir: &Path,
    ) -> StorageResult<TransferReceipt> {
        validate_file_name(file_name)?;
        validate_folder(folder)?;
        self.take_failure()?;

        let remote_path = site.file_path(folder, file_name);
        let content = self
            .get_path(&remote_path)
            .ok_or_else(|| StorageError::NotFound {
                remote_path: remote_path.clone(),
            })?;

        let local_path = sink_dir.join(file_name);
        std::fs::write(&local_path, &content)?;
        Ok(TransferReceipt::new(
            Transfer::Download,
            remote_path,
            local_path,
            &content,
        ))
    }
}
