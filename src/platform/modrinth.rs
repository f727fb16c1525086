//! Modrinth adapter over the public v2 API
//!
//! Modrinth supplies the version string authoritatively in the listing, so
//! resolution never downloads an artifact; changelogs are inlined in the
//! listing as well.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::platform::error::PlatformError;
use crate::platform::traits::ModPlatform;
use crate::platform::types::{FileKey, ModLoader, ProjectData, ResolvableVersion};

/// Default base URL for the Modrinth API
const DEFAULT_BASE_URL: &str = "https://api.modrinth.com/v2";

/// Response from `project/{id}`
#[derive(Debug, Deserialize)]
struct ModrinthProjectResponse {
    slug: String,
    project_type: String,
}

/// One entry of the `project/{id}/version` listing
#[derive(Debug, Deserialize)]
struct ModrinthVersionResponse {
    project_id: String,
    id: String,
    name: String,
    version_number: String,
    version_type: String,
    date_published: String,
    game_versions: Vec<String>,
    #[serde(default)]
    changelog: Option<String>,
}

/// One published Modrinth version, normalized for the generator
#[derive(Debug, Clone)]
pub struct ModrinthVersion {
    project_id: String,
    version_id: String,
    name: String,
    version_number: String,
    stable: bool,
    date: DateTime<Utc>,
    game_versions: BTreeSet<String>,
    changelog: String,
}

/// Platform adapter for Modrinth
pub struct ModrinthPlatform {
    client: reqwest::Client,
    base_url: String,
}

impl ModrinthPlatform {
    /// Creates a new ModrinthPlatform with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("moddingx/updatejson")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, PlatformError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            warn!("Modrinth returned status {}: {}", status, url);
            return Err(PlatformError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl Default for ModrinthPlatform {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl ModPlatform for ModrinthPlatform {
    type File = ModrinthVersion;

    async fn project(&self, project_id: &str) -> Result<ProjectData, PlatformError> {
        let url = format!("{}/project/{}", self.base_url, project_id);
        let project: ModrinthProjectResponse = self.get(&url, &[]).await?.json().await.map_err(|e| {
            warn!("Failed to parse Modrinth project response: {}", e);
            PlatformError::InvalidResponse(e.to_string())
        })?;

        let homepage = format!(
            "https://modrinth.com/{}/{}",
            project.project_type, project.slug
        );
        Ok(ProjectData {
            slug: project.slug,
            homepage,
        })
    }

    async fn list_files(
        &self,
        project_id: &str,
        loaders: &[ModLoader],
    ) -> Result<Vec<ModrinthVersion>, PlatformError> {
        let loader_filter = format!(
            "[{}]",
            loaders
                .iter()
                .map(|loader| format!("\"{}\"", loader.as_str()))
                .collect::<Vec<_>>()
                .join(",")
        );
        let url = format!("{}/project/{}/version", self.base_url, project_id);
        let listing: Vec<ModrinthVersionResponse> = self
            .get(&url, &[("loaders", loader_filter.as_str())])
            .await?
            .json()
            .await
            .map_err(|e| {
                warn!("Failed to parse Modrinth version listing: {}", e);
                PlatformError::InvalidResponse(e.to_string())
            })?;

        listing
            .into_iter()
            .map(|entry| {
                let date = DateTime::parse_from_rfc3339(&entry.date_published)
                    .map_err(|e| {
                        PlatformError::InvalidResponse(format!(
                            "bad date_published '{}': {}",
                            entry.date_published, e
                        ))
                    })?
                    .with_timezone(&Utc);
                Ok(ModrinthVersion {
                    project_id: entry.project_id,
                    version_id: entry.id,
                    name: entry.name,
                    version_number: entry.version_number,
                    stable: entry.version_type.eq_ignore_ascii_case("release"),
                    date,
                    game_versions: entry.game_versions.into_iter().collect(),
                    changelog: entry.changelog.unwrap_or_default(),
                })
            })
            .collect()
    }

    fn key(&self, file: &ModrinthVersion) -> FileKey {
        FileKey::new(file.project_id.clone(), file.version_id.clone())
    }

    fn file_name<'a>(&self, file: &'a ModrinthVersion) -> &'a str {
        &file.name
    }

    fn is_stable(&self, file: &ModrinthVersion) -> bool {
        file.stable
    }

    fn game_versions<'a>(&self, file: &'a ModrinthVersion) -> &'a BTreeSet<String> {
        &file.game_versions
    }

    fn file_date(&self, file: &ModrinthVersion) -> DateTime<Utc> {
        file.date
    }

    async fn changelog(&self, file: &ModrinthVersion) -> Result<String, PlatformError> {
        Ok(file.changelog.clone())
    }

    fn version(&self, file: &ModrinthVersion) -> ResolvableVersion {
        ResolvableVersion::Known(file.version_number.clone())
    }
}
