//! SharePoint connection settings.
//!
//! Read once from an explicit [`Environment`] snapshot at activation time.

use std::fmt;
use std::time::Duration;

use depkit_core::{ActivationError, Environment};

use crate::error::StorageResult;
use crate::site::{SiteUrl, DEFAULT_LIBRARY};

pub const ENV_BASE_URL: &str = "SHAREPOINT_BASEURL";
pub const ENV_SITE: &str = "SHAREPOINT_BASESITE";
pub const ENV_USERNAME: &str = "AZURE_UID";
pub const ENV_PASSWORD: &str = "AZURE_PASS";
pub const ENV_TIMEOUT_SECS: &str = "SHAREPOINT_TIMEOUT_SECS";
pub const ENV_LIBRARY: &str = "SHAREPOINT_LIBRARY";

/// Upper bound on any single SharePoint call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct SharePointConfig {
    /// Tenant URL, e.g. `https://contoso.sharepoint.com`
    pub base_url: String,
    /// Site name under `/sites/`
    pub site: String,
    pub username: String,
    pub password: String,
    /// Document library holding the files
    pub library: String,
    /// Per-call timeout enforced by the HTTP client
    pub timeout: Duration,
}

impl SharePointConfig {
    pub fn new(base_url: &str, site: &str, username: &str, password: &str) -> Self {
        SharePointConfig {
            base_url: base_url.to_string(),
            site: site.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            library: DEFAULT_LIBRARY.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read settings from the activation environment.
    ///
    /// The four connection variables are required; timeout and library fall
    /// back to their defaults.
    pub fn from_env(env: &Environment) -> Result<Self, ActivationError> {
        let mut config = SharePointConfig::new(
            env.require(ENV_BASE_URL)?,
            env.require(ENV_SITE)?,
            env.require(ENV_USERNAME)?,
            env.require(ENV_PASSWORD)?,
        );

        if let Some(raw) = env.get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ActivationError::Storage(format!(
                    "{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}"
                ))
            })?;
            if secs == 0 {
                return Err(ActivationError::Storage(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(library) = env.get(ENV_LIBRARY).filter(|l| !l.trim().is_empty()) {
            config.library = library.to_string();
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_library(mut self, library: &str) -> Self {
        self.library = library.to_string();
        self
    }

    pub fn site_url(&self) -> StorageResult<SiteUrl> {
        Ok(SiteUrl::new(&self.base_url, &self.site)?.with_library(&self.library))
    }
}

impl fmt::Debug for SharePointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharePointConfig")
            .field("base_url", &self.base_url)
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("library", &self.library)
            .field("timeout", &self.timeout)
            .finish()
    }
}
