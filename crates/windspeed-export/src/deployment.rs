//! The windspeed export deployment.
//!
//! At construction it loads the bundled windspeed dataset and connects to
//! SharePoint. Each request uploads a dataset to, or downloads one from, the
//! library folder named in the payload, or previews the bundled dataset.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use depkit_core::{
    Activation, ActivationError, Context, Dataset, DatasetError, Deployment, IoType, Payload,
    RequestError, DEFAULT_SEPARATOR,
};
use serde_json::{json, Value};
use sharepoint_bridge::site::{validate_file_name, validate_folder};
use sharepoint_bridge::{
    DocumentStorage, SharePointClient, SharePointConfig, SiteUrl, StorageError, TransferReceipt,
};
use tracing::{debug, info};

use crate::action::Action;
use crate::{DATASET_FILE, FIELD_FILE, FIELD_FOLDER, FIELD_INPUT, OUTPUT_FIELD, PREVIEW_ROWS};

pub struct WindspeedExport {
    context: Context,
    dataset: Dataset,
    site: SiteUrl,
    storage: Arc<dyn DocumentStorage>,
}

impl WindspeedExport {
    /// Construct around an already-built storage collaborator.
    pub fn with_storage(
        activation: Activation,
        site: SiteUrl,
        storage: Arc<dyn DocumentStorage>,
    ) -> Result<Self, ActivationError> {
        check_context(&activation.context)?;

        let path = activation.require_file(DATASET_FILE)?;
        let dataset = Dataset::read_csv(&path, DEFAULT_SEPARATOR)?;
        info!(
            deployment = %activation.context.deployment,
            rows = dataset.len(),
            columns = dataset.columns().len(),
            site = %site,
            "loaded windspeed dataset"
        );

        Ok(WindspeedExport {
            context: activation.context,
            dataset,
            site,
            storage,
        })
    }

    /// The dataset loaded at construction.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn site(&self) -> &SiteUrl {
        &self.site
    }

    async fn upload(&self, payload: &Payload) -> Result<Value, RequestError> {
        let folder = checked_folder(payload)?;
        let file_name = checked_file_name(payload)?;

        let dataset: Cow<'_, Dataset> = match payload.field(FIELD_INPUT) {
            Some(input) => Cow::Owned(Dataset::from_split_json(input).map_err(|e| {
                RequestError::InvalidField {
                    field: FIELD_INPUT.to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => Cow::Borrowed(&self.dataset),
        };

        let staging = tempfile::tempdir()?;
        let local = staging.path().join(file_name);
        dataset.write_csv(&local, DEFAULT_SEPARATOR)?;
        debug!(local = %local.display(), rows = dataset.len(), "staged upload");

        let receipt = self
            .storage
            .upload(&local, folder, file_name, &self.site)
            .await
            .map_err(storage_err)?;
        Ok(summary(Action::Upload, &receipt, &dataset))
    }

    async fn download(&self, payload: &Payload) -> Result<Value, RequestError> {
        let folder = checked_folder(payload)?;
        let file_name = checked_file_name(payload)?;

        let staging = tempfile::tempdir()?;
        let receipt = self
            .storage
            .download(folder, file_name, &self.site, staging.path())
            .await
            .map_err(storage_err)?;
        let dataset = read_downloaded(&receipt.local_path)?;
        Ok(summary(Action::Download, &receipt, &dataset))
    }

    fn preview(&self) -> Value {
        json!({
            "status": "previewed",
            "action": Action::Preview.as_str(),
            "rows": self.dataset.len(),
            "columns": self.dataset.columns(),
            "preview": self.dataset.head(PREVIEW_ROWS).to_split_json(),
        })
    }
}

#[async_trait]
impl Deployment for WindspeedExport {
    fn construct(activation: Activation) -> Result<Self, ActivationError> {
        check_context(&activation.context)?;

        let config = SharePointConfig::from_env(&activation.environment)?;
        let site = config
            .site_url()
            .map_err(|e| ActivationError::Storage(e.to_string()))?;
        let client =
            SharePointClient::new(&config).map_err(|e| ActivationError::Storage(e.to_string()))?;

        Self::with_storage(activation, site, Arc::new(client))
    }

    fn context(&self) -> &Context {
        &self.context
    }

    async fn request(&self, payload: Payload) -> Result<Payload, RequestError> {
        let action = Action::from_payload(&payload)?;
        debug!(action = action.as_str(), "handling request");

        let output = match action {
            Action::Upload => self.upload(&payload).await?,
            Action::Download => self.download(&payload).await?,
            Action::Preview => self.preview(),
        };
        Ok(Payload::structured([(OUTPUT_FIELD, output)]))
    }
}

fn check_context(context: &Context) -> Result<(), ActivationError> {
    if context.input_type != IoType::Structured || context.output_type != IoType::Structured {
        return Err(ActivationError::UnsupportedContext(format!(
            "{} needs structured input and output, got {} -> {}",
            context.deployment, context.input_type, context.output_type
        )));
    }
    Ok(())
}

fn checked_file_name(payload: &Payload) -> Result<&str, RequestError> {
    let file_name = payload.require_str(FIELD_FILE)?;
    validate_file_name(file_name).map_err(|e| RequestError::InvalidField {
        field: FIELD_FILE.to_string(),
        reason: e.to_string(),
    })?;
    Ok(file_name)
}

fn checked_folder(payload: &Payload) -> Result<&str, RequestError> {
    let folder = payload.require_str(FIELD_FOLDER)?;
    validate_folder(folder).map_err(|e| RequestError::InvalidField {
        field: FIELD_FOLDER.to_string(),
        reason: e.to_string(),
    })?;
    Ok(folder)
}

fn read_downloaded(path: &Path) -> Result<Dataset, RequestError> {
    Dataset::read_csv(path, DEFAULT_SEPARATOR).map_err(|e| match e {
        DatasetError::NotFound { path } => RequestError::MissingFile { path },
        other => RequestError::from(other),
    })
}

fn storage_err(e: StorageError) -> RequestError {
    match e {
        StorageError::InvalidPath(reason) => RequestError::InvalidField {
            field: FIELD_FILE.to_string(),
            reason,
        },
        other => RequestError::Storage(other.to_string()),
    }
}

/// Request output. Holds no timestamps or local paths, so repeating a
/// request against unchanged storage gives an equal result.
fn summary(action: Action, receipt: &TransferReceipt, dataset: &Dataset) -> Value {
    json!({
        "status": receipt.status(),
        "action": action.as_str(),
        "remote_path": receipt.remote_path,
        "bytes": receipt.bytes,
        "sha256": receipt.sha256,
        "rows": dataset.len(),
        "columns": dataset.columns(),
        "preview": dataset.head(PREVIEW_ROWS).to_split_json(),
    })
}
