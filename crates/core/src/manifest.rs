//! The asset manifest: root-relative paths precached on install.

use url::Url;

use crate::Error;

/// Ordered, de-duplicated set of root-relative asset paths plus the offline
/// fallback page, which is always one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    paths: Vec<String>,
    offline_path: String,
}

impl AssetManifest {
    /// Build a manifest, keeping the first occurrence of duplicate paths.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the manifest is empty, a path is not
    /// root-relative, or the offline path is not listed.
    pub fn new<I, S>(paths: I, offline_path: impl Into<String>) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into();
            if !path.starts_with('/') {
                return Err(Error::InvalidInput(format!("manifest path must be root-relative: {path}")));
            }
            if !deduped.contains(&path) {
                deduped.push(path);
            }
        }

        if deduped.is_empty() {
            return Err(Error::InvalidInput("asset manifest is empty".into()));
        }

        let offline_path = offline_path.into();
        if !deduped.contains(&offline_path) {
            return Err(Error::InvalidInput(format!("offline page {offline_path} is not in the asset manifest")));
        }

        Ok(Self { paths: deduped, offline_path })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn offline_path(&self) -> &str {
        &self.offline_path
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Resolve every path against `origin`, preserving manifest order.
    pub fn resolve(&self, origin: &Url) -> Result<Vec<Url>, Error> {
        self.paths.iter().map(|p| join(origin, p)).collect()
    }

    /// Absolute URL of the offline fallback page.
    pub fn offline_url(&self, origin: &Url) -> Result<Url, Error> {
        join(origin, &self.offline_path)
    }
}

fn join(origin: &Url, path: &str) -> Result<Url, Error> {
    origin
        .join(path)
        .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
}
