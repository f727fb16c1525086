//! Platform trait for listing and describing published mod files

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::platform::error::PlatformError;
use crate::platform::types::{FileKey, ModLoader, ProjectData, ResolvableVersion};

/// Trait one hosting platform implements
///
/// The associated `File` type is the adapter's own record of one published
/// artifact; the core never looks inside it except through these
/// accessors.
#[async_trait::async_trait]
pub trait ModPlatform: Send + Sync {
    type File: Send + Sync;

    /// Looks up project-level metadata (slug, homepage)
    ///
    /// # Returns
    /// * `Err(PlatformError::NotFound)` for an unknown project
    /// * `Err(PlatformError::InvalidProjectId)` for an id the platform
    ///   cannot parse
    async fn project(&self, project_id: &str) -> Result<ProjectData, PlatformError>;

    /// Lists all published files for the given loaders
    ///
    /// A transient error (see [`PlatformError::is_transient`]) signals
    /// that the whole per-project generation step may be retried.
    async fn list_files(
        &self,
        project_id: &str,
        loaders: &[ModLoader],
    ) -> Result<Vec<Self::File>, PlatformError>;

    /// Stable cache identity of the file
    fn key(&self, file: &Self::File) -> FileKey;

    /// Human-readable file name, used in diagnostics only
    fn file_name<'a>(&self, file: &'a Self::File) -> &'a str;

    /// Whether the file is a stable release (candidate for "recommended")
    fn is_stable(&self, file: &Self::File) -> bool;

    /// Game versions the file targets; may be empty
    fn game_versions<'a>(&self, file: &'a Self::File) -> &'a BTreeSet<String>;

    /// Publication timestamp
    fn file_date(&self, file: &Self::File) -> DateTime<Utc>;

    /// Raw changelog markup; may require a network round trip
    async fn changelog(&self, file: &Self::File) -> Result<String, PlatformError>;

    /// Version descriptor, authoritative or deferred to the artifact
    fn version(&self, file: &Self::File) -> ResolvableVersion;
}
