use thiserror::Error;

/// Failure of a single extraction strategy
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Invalid mods.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid mcmod.info: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected top-level structure")]
    InvalidStructure,

    #[error("No mod definitions found")]
    NoDefinitions,

    #[error("Multiple mod definitions found")]
    MultipleDefinitions,

    #[error("Version field is missing or not a string")]
    MissingVersion,

    #[error("Version is an unresolved build-time variable")]
    PlaceholderVersion,

    #[error("No Implementation-Version line in jar manifest")]
    NoImplementationVersion,

    #[error("Invalid module descriptor: {0}")]
    Module(#[from] ModuleInfoError),
}

/// Failure of the whole archive extraction
///
/// `NoVersion` carries every attempted strategy together with its reason,
/// so a log line shows all of them rather than just the first.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("No version in archive metadata: {}", render_attempts(.attempts))]
    NoVersion { attempts: Vec<(String, StrategyError)> },
}

fn render_attempts(attempts: &[(String, StrategyError)]) -> String {
    if attempts.is_empty() {
        "no known metadata entries present".to_string()
    } else {
        attempts
            .iter()
            .map(|(entry, err)| format!("{entry}: {err}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Failure while decoding a `module-info.class` entry
#[derive(Debug, Error)]
pub enum ModuleInfoError {
    #[error("Unexpected end of class file")]
    Truncated,

    #[error("Not a class file")]
    BadMagic,

    #[error("Unsupported constant pool tag {0}")]
    UnsupportedConstant(u8),

    #[error("Constant pool index {0} is not a utf8 entry")]
    BadConstantIndex(u16),

    #[error("No Module attribute in class file")]
    NoModuleAttribute,

    #[error("Module descriptor declares no version")]
    NoVersion,
}

/// Failure while resolving a deferred version from its artifact
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_version_error_lists_every_attempt() {
        let err = ExtractError::NoVersion {
            attempts: vec![
                (
                    "META-INF/mods.toml".to_string(),
                    StrategyError::PlaceholderVersion,
                ),
                (
                    "META-INF/MANIFEST.MF".to_string(),
                    StrategyError::NoImplementationVersion,
                ),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("META-INF/mods.toml"));
        assert!(message.contains("unresolved build-time variable"));
        assert!(message.contains("META-INF/MANIFEST.MF"));
        assert!(message.contains("Implementation-Version"));
    }

    #[test]
    fn no_version_error_without_attempts_mentions_missing_entries() {
        let err = ExtractError::NoVersion { attempts: vec![] };
        assert!(err.to_string().contains("no known metadata entries"));
    }
}
