//! Everything a component receives when its version is activated.
//!
//! Environment variables are captured once into an explicit [`Environment`]
//! snapshot; components never read the process environment themselves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::error::ActivationError;

/// Snapshot of the environment variables visible to a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        Environment {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Snapshot from explicit `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or replace one variable.
    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Value of a variable, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Fetch a variable that must be present and non-empty.
    pub fn require(&self, name: &str) -> Result<&str, ActivationError> {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ActivationError::MissingEnvVar {
                name: name.to_string(),
            }),
        }
    }

    /// Number of captured variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Construction input for a deployment instance.
#[derive(Debug, Clone)]
pub struct Activation {
    pub base_directory: PathBuf,
    pub context: Context,
    pub environment: Environment,
}

impl Activation {
    /// Bundle activation inputs. The base directory must already exist.
    pub fn new(
        base_directory: impl Into<PathBuf>,
        context: Context,
        environment: Environment,
    ) -> Result<Self, ActivationError> {
        let base_directory = base_directory.into();
        if !base_directory.is_dir() {
            return Err(ActivationError::BaseDirectory {
                path: base_directory,
            });
        }
        Ok(Activation {
            base_directory,
            context,
            environment,
        })
    }

    /// Path of a file relative to the base directory.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base_directory.join(relative)
    }

    /// Resolve a file the component cannot start without.
    pub fn require_file(&self, relative: impl AsRef<Path>) -> Result<PathBuf, ActivationError> {
        let path = self.resolve(relative);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ActivationError::MissingFile { path })
        }
    }
}
