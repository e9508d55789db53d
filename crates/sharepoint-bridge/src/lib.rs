//! SharePoint bridge: document storage collaborator for deployments
//!
//! Uploads a local file into, or downloads a file out of, a folder of a
//! SharePoint document library. Deployments depend on the
//! [`DocumentStorage`] trait; [`SharePointClient`] is the production
//! implementation and [`fakes::MemoryDocumentLibrary`] the test double.

pub mod client;
pub mod config;
pub mod error;
pub mod fakes;
pub mod site;
pub mod storage;

pub use client::SharePointClient;
pub use config::SharePointConfig;
pub use error::{StorageError, StorageResult};
pub use site::{SiteUrl, DEFAULT_LIBRARY};
pub use storage::{DocumentStorage, Transfer, TransferReceipt};
