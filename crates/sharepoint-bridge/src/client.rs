//! SharePoint REST client
//!
//! Uploads and downloads single files through the site's `_api/web`
//! endpoints. Writes need a form digest from `_api/contextinfo`, fetched
//! fresh for every upload so the client holds no mutable state.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::SharePointConfig;
use crate::error::{StorageError, StorageResult};
use crate::site::{odata_literal, validate_file_name, validate_folder, SiteUrl};
use crate::storage::{DocumentStorage, Transfer, TransferReceipt};

const JSON_NOMETADATA: &str = "application/json;odata=nometadata";
const REQUEST_DIGEST: &str = "X-RequestDigest";

/// Paths travel as parameter aliases in the query string so reqwest
/// percent-encodes them; names may contain `#`, `%` or `'`.
const UPLOAD_ENDPOINT: &str = "web/GetFolderByServerRelativeUrl(@f)/Files/add(url=@n,overwrite=true)";
const DOWNLOAD_ENDPOINT: &str = "web/GetFileByServerRelativeUrl(@p)/$value";

/// OData string literal for a parameter alias value.
fn alias_value(value: &str) -> String {
    format!("'{}'", odata_literal(value))
}

#[derive(Deserialize)]
struct ContextInfo {
    #[serde(rename = "FormDigestValue")]
    form_digest_value: String,
}

/// Document storage backed by a SharePoint site.
pub struct SharePointClient {
    http: reqwest::Client,
    username: String,
    password: String,
}

impl SharePointClient {
    /// Build a client. The configured timeout bounds every request.
    pub fn new(config: &SharePointConfig) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("depkit-sharepoint-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(SharePointClient {
            http,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    async fn form_digest(&self, site: &SiteUrl) -> StorageResult<String> {
        let url = site.api("contextinfo");
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, JSON_NOMETADATA)
            .body(Vec::new())
            .send()
            .await?;
        let response = check_status(response, &url)?;
        let info: ContextInfo = response
            .json()
            .await
            .map_err(|e| StorageError::Protocol(format!("contextinfo: {e}")))?;
        Ok(info.form_digest_value)
    }
}

#[async_trait]
impl DocumentStorage for SharePointClient {
    async fn upload(
        &self,
        local_path: &Path,
        folder: &str,
        file_name: &str,
        site: &SiteUrl,
    ) -> StorageResult<TransferReceipt> {
        validate_file_name(file_name)?;
        validate_folder(folder)?;
        let content = tokio::fs::read(local_path)
            .await
            .map_err(|source| StorageError::LocalFile {
                path: local_path.to_path_buf(),
                source,
            })?;

        let digest = self.form_digest(site).await?;
        let url = site.api(UPLOAD_ENDPOINT);
        let remote_path = site.file_path(folder, file_name);
        let receipt = TransferReceipt::new(
            Transfer::Upload,
            remote_path,
            local_path.to_path_buf(),
            &content,
        );
        debug!(url = %url, bytes = receipt.bytes, "uploading file");

        let response = self
            .http
            .post(&url)
            .query(&[
                ("@f", alias_value(&site.folder_path(folder))),
                ("@n", alias_value(file_name)),
            ])
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, JSON_NOMETADATA)
            .header(REQUEST_DIGEST, digest)
            .body(content)
            .send()
            .await?;
        check_status(response, &url)?;

        info!(remote_path = %receipt.remote_path, bytes = receipt.bytes, "uploaded to SharePoint");
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
        let remote_path = site.file_path(folder, file_name);
        let url = site.api(DOWNLOAD_ENDPOINT);
        debug!(url = %url, "downloading file");

        let response = self
            .http
            .get(&url)
            .query(&[("@p", alias_value(&remote_path))])
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound { remote_path });
        }
        let content = check_status(response, &url)?.bytes().await?;

        let local_path: PathBuf = sink_dir.join(file_name);
        tokio::fs::write(&local_path, &content).await?;

        info!(remote_path = %remote_path, bytes = content.len(), "downloaded from SharePoint");
        Ok(TransferReceipt::new(
            Transfer::Download,
            remote_path,
            local_path,
            &content,
        ))
    }
}

fn check_status(response: Response, url: &str) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StorageError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}
