//! Archive metadata extraction
//!
//! A packaged mod archive can declare its version in several places. The
//! known entries are tried in fixed priority order; only entries actually
//! present in the archive are attempted, the first success wins, and when
//! nothing succeeds every attempted failure is reported together.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;
use zip::ZipArchive;

use crate::version::error::{ExtractError, StrategyError};
use crate::version::module_info;

/// Forge mod manifest (table-of-tables, one `[[mods]]` entry expected)
pub const MOD_INFO_TOML: &str = "META-INF/mods.toml";
/// Legacy mod descriptor (json object or one-element array)
pub const MOD_INFO_LEGACY: &str = "mcmod.info";
/// Plain-text jar packaging manifest
pub const JAR_MANIFEST: &str = "META-INF/MANIFEST.MF";
/// Java module descriptor
pub const MODULE_DESCRIPTOR: &str = "module-info.class";

type Strategy = fn(&[u8]) -> Result<String, StrategyError>;

/// Extraction strategies in priority order
const STRATEGIES: [(&str, Strategy); 4] = [
    (MOD_INFO_TOML, version_from_mods_toml),
    (MOD_INFO_LEGACY, version_from_legacy),
    (JAR_MANIFEST, version_from_manifest),
    (MODULE_DESCRIPTOR, version_from_module),
];

static MANIFEST_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Implementation-Version\s*:\s*(.*?)\s*$").expect("manifest regex is valid")
});

/// Extracts a version string from the raw bytes of a zip archive
///
/// # Returns
/// * `Ok(version)` from the first strategy whose entry is present and
///   decodes to a non-placeholder version
/// * `Err(ExtractError::NoVersion)` with all attempted failure reasons
///   when no strategy succeeds
pub fn extract_version(data: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let mut entries: HashMap<String, Vec<u8>> = HashMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().trim_start_matches('/').to_string();
        if STRATEGIES.iter().any(|(known, _)| *known == name) {
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            entries.insert(name, content);
        }
    }

    let mut attempts = Vec::new();
    for (name, strategy) in STRATEGIES {
        let Some(content) = entries.get(name) else {
            continue;
        };
        match strategy(content) {
            Ok(version) => return Ok(version),
            Err(reason) => attempts.push((name.to_string(), reason)),
        }
    }

    Err(ExtractError::NoVersion { attempts })
}

/// A leading `$` marks a build-time substitution that was never expanded
fn reject_placeholder(version: &str) -> Result<String, StrategyError> {
    if version.starts_with('$') {
        Err(StrategyError::PlaceholderVersion)
    } else {
        Ok(version.to_string())
    }
}

fn text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn version_from_mods_toml(data: &[u8]) -> Result<String, StrategyError> {
    let value: toml::Value = toml::from_str(&text(data))?;
    let mods = value
        .get("mods")
        .and_then(|mods| mods.as_array())
        .ok_or(StrategyError::NoDefinitions)?;
    let definition = match mods.as_slice() {
        [] => return Err(StrategyError::NoDefinitions),
        [definition] => definition,
        _ => return Err(StrategyError::MultipleDefinitions),
    };
    let version = definition
        .get("version")
        .and_then(|version| version.as_str())
        .ok_or(StrategyError::MissingVersion)?;
    reject_placeholder(version.trim())
}

fn version_from_legacy(data: &[u8]) -> Result<String, StrategyError> {
    let json: serde_json::Value = serde_json::from_str(&text(data))?;
    let definition = match &json {
        serde_json::Value::Array(entries) => match entries.as_slice() {
            [] => return Err(StrategyError::NoDefinitions),
            [entry] => entry,
            _ => return Err(StrategyError::MultipleDefinitions),
        },
        serde_json::Value::Object(_) => &json,
        _ => return Err(StrategyError::InvalidStructure),
    };
    let version = definition
        .get("version")
        .and_then(|version| version.as_str())
        .ok_or(StrategyError::MissingVersion)?;
    reject_placeholder(version.trim())
}

fn version_from_manifest(data: &[u8]) -> Result<String, StrategyError> {
    text(data)
        .lines()
        .find_map(|line| {
            MANIFEST_VERSION
                .captures(line)
                .map(|captures| captures[1].trim().to_string())
        })
        .ok_or(StrategyError::NoImplementationVersion)
}

fn version_from_module(data: &[u8]) -> Result<String, StrategyError> {
    Ok(module_info::module_version(data)?)
}
