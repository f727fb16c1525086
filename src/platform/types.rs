//! Common types for platform adapters

/// Identity of one published artifact
///
/// Adapters stringify their native ids (numeric on CurseForge, string on
/// Modrinth) so equality stays stable across cache serialization
/// round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    /// Platform-native project id
    pub project: String,
    /// Platform-native file/version id
    pub file: String,
}

impl FileKey {
    pub fn new(project: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            file: file.into(),
        }
    }
}

/// Project-level metadata needed for the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectData {
    /// Canonical slug, used as the output file name
    pub slug: String,
    /// Homepage URL recorded in the manifest
    pub homepage: String,
}

/// Mod loaders a file listing can be filtered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModLoader {
    Forge,
    #[value(name = "neoforge")]
    NeoForge,
}

impl ModLoader {
    /// Returns the loader id used in platform requests
    pub fn as_str(&self) -> &'static str {
        match self {
            ModLoader::Forge => "forge",
            ModLoader::NeoForge => "neoforge",
        }
    }
}

/// A version that is either platform-supplied or derived from the artifact
///
/// `Known` carries an authoritative version string and resolves without any
/// cache or network interaction. `FromArchive` carries the artifact
/// download URL; resolution downloads the archive and inspects its
/// metadata entries, memoized through the file cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvableVersion {
    Known(String),
    FromArchive(String),
}
