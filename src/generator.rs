//! Manifest synthesis
//!
//! Turns a project's full file list into the update-checker document: a
//! promotions map naming the most recent stable ("recommended") and most
//! recent overall ("latest") resolvable version per game version, plus one
//! chronological `version -> changelog` history per game version.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::FileCache;
use crate::changelog;
use crate::platform::{ModLoader, ModPlatform, PlatformError};
use crate::version::VersionResolver;

/// The synthesized update-checker document
///
/// Map insertion order is semantic: consumers read each release map
/// top-to-bottom as a chronological log, oldest first.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub homepage: String,
    pub promos: IndexMap<String, String>,
    #[serde(flatten)]
    pub releases: IndexMap<String, IndexMap<String, String>>,
}

/// Generates the manifest for one project
///
/// Failures local to one file (unresolvable version, changelog fetch
/// error) degrade to omission or an empty changelog; only project-level
/// failures (lookup, listing) abort with an error.
///
/// # Returns
/// The project slug (used as the output file name) and the manifest.
pub async fn generate<P: ModPlatform>(
    platform: &P,
    resolver: &VersionResolver,
    cache: &mut FileCache,
    project_id: &str,
    loaders: &[ModLoader],
) -> Result<(String, Manifest), PlatformError> {
    let project = platform.project(project_id).await?;
    info!("Generating update checker for {}", project.slug);

    let mut files = platform.list_files(project_id, loaders).await?;
    // Most recent first; promotions scan from the top
    files.sort_by(|a, b| platform.file_date(b).cmp(&platform.file_date(a)));

    let game_versions: BTreeSet<String> = files
        .iter()
        .flat_map(|file| platform.game_versions(file).iter().cloned())
        .collect();

    let mut promos = IndexMap::new();
    for game_version in &game_versions {
        let targeting: Vec<&P::File> = files
            .iter()
            .filter(|file| platform.game_versions(file).contains(game_version))
            .collect();

        let mut recommended = None;
        for file in &targeting {
            if !platform.is_stable(file) {
                continue;
            }
            if let Some(version) = resolve(platform, resolver, cache, file).await {
                recommended = Some(version);
                break;
            }
        }
        let mut latest = None;
        for file in &targeting {
            if let Some(version) = resolve(platform, resolver, cache, file).await {
                latest = Some(version);
                break;
            }
        }

        if let Some(version) = recommended {
            promos.insert(format!("{game_version}-recommended"), version);
        }
        if let Some(version) = latest {
            promos.insert(format!("{game_version}-latest"), version);
        }
    }

    let mut releases = IndexMap::new();
    for game_version in &game_versions {
        let mut history: IndexMap<String, String> = IndexMap::new();
        // Oldest first; a version string seen twice keeps its first
        // position but takes the newer changelog
        for file in files
            .iter()
            .rev()
            .filter(|file| platform.game_versions(file).contains(game_version))
        {
            let Some(version) = resolve(platform, resolver, cache, file).await else {
                continue;
            };
            let key = platform.key(file);
            let text = cache
                .changelog(&key, || async {
                    match platform.changelog(file).await {
                        Ok(raw) => changelog::process(&raw),
                        Err(e) => {
                            warn!(
                                "Failed to fetch changelog for '{}': {}",
                                platform.file_name(file),
                                e
                            );
                            String::new()
                        }
                    }
                })
                .await;
            history.insert(version, text);
        }
        releases.insert(game_version.clone(), history);
    }

    Ok((
        project.slug,
        Manifest {
            homepage: project.homepage,
            promos,
            releases,
        },
    ))
}

async fn resolve<P: ModPlatform>(
    platform: &P,
    resolver: &VersionResolver,
    cache: &mut FileCache,
    file: &P::File,
) -> Option<String> {
    resolver
        .resolve(
            &platform.key(file),
            platform.file_name(file),
            platform.version(file),
            cache,
        )
        .await
}
