//! Site addressing for a SharePoint document library.

use std::fmt;

use reqwest::Url;

use crate::error::{StorageError, StorageResult};

/// Default document library of a SharePoint site.
pub const DEFAULT_LIBRARY: &str = "Shared Documents";

/// A SharePoint site (`{base}/sites/{site}/`) and the library files live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl {
    url: Url,
    site: String,
    library: String,
}

impl SiteUrl {
    /// Build a site URL from a tenant base URL such as
    /// `https://contoso.sharepoint.com` and a site name.
    pub fn new(base_url: &str, site: &str) -> StorageResult<Self> {
        let base = base_url.trim().trim_end_matches('/');
        let site = site.trim().trim_matches('/');
        if site.is_empty() || site.contains('/') {
            return Err(StorageError::InvalidEndpoint(format!(
                "site name {site:?} must be a single path segment"
            )));
        }

        let url = Url::parse(&format!("{base}/sites/{site}/"))
            .map_err(|e| StorageError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(StorageError::InvalidEndpoint(format!(
                "{base_url}: expected an http(s) URL with a host"
            )));
        }

        Ok(SiteUrl {
            url,
            site: site.to_string(),
            library: DEFAULT_LIBRARY.to_string(),
        })
    }

    pub fn with_library(mut self, library: &str) -> Self {
        self.library = library.trim_matches('/').to_string();
        self
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    /// Server-relative path of a folder inside the library.
    pub fn folder_path(&self, folder: &str) -> String {
        let folder = folder.trim().trim_matches('/');
        if folder.is_empty() {
            format!("/sites/{}/{}", self.site, self.library)
        } else {
            format!("/sites/{}/{}/{}", self.site, self.library, folder)
        }
    }

    /// Server-relative path of a file inside a library folder.
    pub fn file_path(&self, folder: &str, file_name: &str) -> String {
        format!("{}/{}", self.folder_path(folder), file_name)
    }

    /// Absolute URL of a REST endpoint under `_api/`.
    pub fn api(&self, endpoint: &str) -> String {
        format!("{}_api/{}", self.url, endpoint)
    }
}

impl fmt::Display for SiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Quote a value for use inside an OData string literal.
pub fn odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Reject file names that would escape the target folder.
pub fn validate_file_name(file_name: &str) -> StorageResult<()> {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidPath("file name is empty".to_string()));
    }
    if trimmed.contains(|c: char| c == '/' || c == '\\') || trimmed == "." || trimmed == ".." {
        return Err(StorageError::InvalidPath(format!(
            "file name {file_name:?} must not contain path separators"
        )));
    }
    Ok(())
}

/// Reject folders that would climb out of the document library.
pub fn validate_folder(folder: &str) -> StorageResult<()> {
    let escapes = folder
        .split(|c: char| c == '/' || c == '\\')
        .map(str::trim)
        .any(|segment| segment == "." || segment == "..");
    if escapes {
        return Err(StorageError::InvalidPath(format!(
            "folder {folder:?} must not contain '.' or '..' segments"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_site_url_from_base_and_site() {
        let site = SiteUrl::new("https://contoso.sharepoint.com/", "Operations").unwrap();
        assert_eq!(site.as_str(), "https://contoso.sharepoint.com/sites/Operations/");
        assert_eq!(site.library(), DEFAULT_LIBRARY);
    }

    #[test]
    fn rejects_malformed_endpoints() {
        assert!(matches!(
            SiteUrl::new("not a url", "Ops"),
            Err(StorageError::InvalidEndpoint(_))
        ));
        assert!(SiteUrl::new("ftp://contoso", "Ops").is_err());
        assert!(SiteUrl::new("https://contoso.sharepoint.com", "").is_err());
        assert!(SiteUrl::new("https://contoso.sharepoint.com", "a/b").is_err());
    }

    #[test]
    fn folder_paths_are_normalized() {
        let site = SiteUrl::new("https://contoso.sharepoint.com", "Ops").unwrap();
        assert_eq!(
            site.folder_path("07 OMM/47 Data Logging/"),
            "/sites/Ops/Shared Documents/07 OMM/47 Data Logging"
        );
        assert_eq!(site.folder_path("/A/B"), "/sites/Ops/Shared Documents/A/B");
        assert_eq!(site.folder_path(""), "/sites/Ops/Shared Documents");
        assert_eq!(
            site.file_path("A/B/", "data.csv"),
            "/sites/Ops/Shared Documents/A/B/data.csv"
        );
    }

    #[test]
    fn custom_library() {
        let site = SiteUrl::new("https://contoso.sharepoint.com", "Ops")
            .unwrap()
            .with_library("/Exports/");
        assert_eq!(site.folder_path("x"), "/sites/Ops/Exports/x");
    }

    #[test]
    fn api_urls_hang_off_the_site() {
        let site = SiteUrl::new("https://contoso.sharepoint.com", "Ops").unwrap();
        assert_eq!(
            site.api("contextinfo"),
            "https://contoso.sharepoint.com/sites/Ops/_api/contextinfo"
        );
    }

    #[test]
    fn odata_literals_double_quotes() {
        assert_eq!(odata_literal("O'Brien's.csv"), "O''Brien''s.csv");
    }

    #[test]
    fn file_names_must_be_single_segment() {
        assert!(validate_file_name("data.csv").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("../data.csv").is_err());
        assert!(validate_file_name("a\\b.csv").is_err());
    }

    #[test]
    fn folders_stay_inside_the_library() {
        assert!(validate_folder("07 OMM/47 Data Logging/").is_ok());
        assert!(validate_folder("").is_ok());
        assert!(validate_folder("v1..v2/data").is_ok());
        assert!(validate_folder("../../Other/Shared Documents").is_err());
        assert!(validate_folder("A/./B").is_err());
        assert!(validate_folder("A\\..\\B").is_err());
    }
}
