//! Deployment context: the immutable descriptor handed to a component at construction.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ActivationError;

/// Payload shape declared for one side (input or output) of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
    /// Mapping from declared field names to values.
    Structured,
    /// A single opaque string.
    Plain,
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoType::Structured => write!(f, "structured"),
            IoType::Plain => write!(f, "plain"),
        }
    }
}

/// Metadata describing a deployed version.
///
/// Supplied once when the version is activated and never mutated afterwards.
/// `input_fields` / `output_fields` list the field names declared for a
/// structured side; they stay empty for a plain side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub deployment: String,
    pub version: String,
    pub input_type: IoType,
    pub output_type: IoType,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub environment_variables: String,
    #[serde(default)]
    pub input_fields: Vec<String>,
    #[serde(default)]
    pub output_fields: Vec<String>,
}

fn default_language() -> String {
    "rust".to_string()
}

impl Context {
    /// Context for a deployment with structured input and output.
    pub fn structured(deployment: &str, version: &str) -> Self {
        Self::new(deployment, version, IoType::Structured, IoType::Structured)
    }

    /// Context for a deployment with plain input and output.
    pub fn plain(deployment: &str, version: &str) -> Self {
        Self::new(deployment, version, IoType::Plain, IoType::Plain)
    }

    /// Context with explicit input and output shapes and no declared fields.
    pub fn new(deployment: &str, version: &str, input_type: IoType, output_type: IoType) -> Self {
        Context {
            deployment: deployment.to_string(),
            version: version.to_string(),
            input_type,
            output_type,
            language: default_language(),
            environment_variables: String::new(),
            input_fields: Vec::new(),
            output_fields: Vec::new(),
        }
    }

    /// Declare the fields every structured request must carry.
    pub fn with_input_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the fields every structured result must carry.
    pub fn with_output_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Record the environment variable names the deployment expects.
    pub fn with_environment_variables(mut self, names: &str) -> Self {
        self.environment_variables = names.to_string();
        self
    }

    /// Load a context from a JSON document on disk.
    ///
    /// Only an absent file is `MissingFile`; any other read failure is
    /// reported as an invalid context carrying the cause.
    pub fn from_json_file(path: &Path) -> Result<Self, ActivationError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ActivationError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => ActivationError::InvalidContext(format!("cannot read {}: {e}", path.display())),
        })?;
        let context: Context = serde_json::from_str(&raw)
            .map_err(|e| ActivationError::InvalidContext(format!("{}: {e}", path.display())))?;
        context.validate()?;
        Ok(context)
    }

    /// Check the invariants a host relies on before constructing a component.
    pub fn validate(&self) -> Result<(), ActivationError> {
        if self.deployment.trim().is_empty() {
            return Err(ActivationError::InvalidContext(
                "deployment name must not be empty".to_string(),
            ));
        }
        if self.version.trim().is_empty() {
            return Err(ActivationError::InvalidContext(
                "version must not be empty".to_string(),
            ));
        }
        if self.input_type == IoType::Plain && !self.input_fields.is_empty() {
            return Err(ActivationError::InvalidContext(
                "plain input cannot declare input fields".to_string(),
            ));
        }
        if self.output_type == IoType::Plain && !self.output_fields.is_empty() {
            return Err(ActivationError::InvalidContext(
                "plain output cannot declare output fields".to_string(),
            ));
        }
        for (side, fields) in [("input", &self.input_fields), ("output", &self.output_fields)] {
            if fields.iter().any(|f| f.trim().is_empty()) {
                return Err(ActivationError::InvalidContext(format!(
                    "{side} field names must not be empty"
                )));
            }
        }
        Ok(())
    }
}
