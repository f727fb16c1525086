//! Cache-backed version resolution
//!
//! Single entry point for turning a [`ResolvableVersion`] into an optional
//! version string. Platform-supplied versions pass through untouched;
//! deferred versions download the artifact and run the metadata extractor,
//! memoized through the cache. Any failure is stored as the `INVALID`
//! sentinel so a permanently broken artifact never retriggers a download;
//! callers only ever see `None`.

use tracing::warn;

use crate::cache::FileCache;
use crate::platform::{FileKey, ResolvableVersion};
use crate::version::error::ResolveError;
use crate::version::extract;

/// Sentinel cached in place of a version when resolution failed
pub const INVALID_VERSION: &str = "INVALID";

/// Downloads artifacts and resolves deferred versions
pub struct VersionResolver {
    client: reqwest::Client,
}

impl VersionResolver {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("moddingx/updatejson")
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Resolves a version descriptor to a canonical version string
    ///
    /// # Arguments
    /// * `key` - cache identity of the file
    /// * `file_name` - display name, used in diagnostics only
    /// * `version` - the platform's version descriptor
    /// * `cache` - memoizes deferred resolutions and their failures
    ///
    /// # Returns
    /// * `Some(version)` when the version is known or extraction succeeds
    /// * `None` when resolution failed now or in a previous run
    pub async fn resolve(
        &self,
        key: &FileKey,
        file_name: &str,
        version: ResolvableVersion,
        cache: &mut FileCache,
    ) -> Option<String> {
        match version {
            ResolvableVersion::Known(version) => Some(version),
            ResolvableVersion::FromArchive(url) => {
                let resolved = cache
                    .version(key, || async {
                        match self.fetch_and_extract(&url).await {
                            Ok(version) => version,
                            Err(e) => {
                                warn!("Failed to resolve version for '{}': {}", file_name, e);
                                INVALID_VERSION.to_string()
                            }
                        }
                    })
                    .await;
                if resolved == INVALID_VERSION {
                    None
                } else {
                    Some(resolved)
                }
            }
        }
    }

    async fn fetch_and_extract(&self, url: &str) -> Result<String, ResolveError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let data = response.bytes().await?;
        Ok(extract::extract_version(&data)?)
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new()
    }
}
