//! What a request asks the deployment to do.

use depkit_core::{Payload, RequestError};

use crate::FIELD_ACTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write a dataset to the library folder (default).
    Upload,
    /// Fetch a file from the library folder and parse it.
    Download,
    /// Report on the bundled dataset without touching storage.
    Preview,
}

impl Action {
    /// Read the optional `action` field; absent means upload.
    pub fn from_payload(payload: &Payload) -> Result<Self, RequestError> {
        match payload.optional_str(FIELD_ACTION)? {
            None => Ok(Action::Upload),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "upload" => Ok(Action::Upload),
                "download" => Ok(Action::Download),
                "preview" => Ok(Action::Preview),
                _ => Err(RequestError::InvalidField {
                    field: FIELD_ACTION.to_string(),
                    reason: format!("unknown action {raw:?}, expected upload, download or preview"),
                }),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Upload => "upload",
            Action::Download => "download",
            Action::Preview => "preview",
        }
    }
}
