//! CurseForge adapter over the moddingx curse wrapper service
//!
//! CurseForge does not expose a usable version string in its file
//! metadata, so every file resolves through the packaged artifact,
//! downloaded from the cursemaven mirror. Changelogs are a separate
//! request per file and arrive as HTML.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::platform::error::PlatformError;
use crate::platform::traits::ModPlatform;
use crate::platform::types::{FileKey, ModLoader, ProjectData, ResolvableVersion};

/// Default base URL for the curse wrapper service
const DEFAULT_BASE_URL: &str = "https://curse.moddingx.org";

/// Default base URL for artifact downloads
const DEFAULT_MAVEN_URL: &str = "https://www.cursemaven.com";

/// Response from `project/{id}`
#[derive(Debug, Deserialize)]
struct CurseProjectResponse {
    slug: String,
    website: String,
}

/// One entry of the `project/{id}/files` listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurseFileResponse {
    project_id: u64,
    file_id: u64,
    name: String,
    release_type: String,
    file_date: String,
    game_versions: Vec<String>,
}

/// One published CurseForge file, normalized for the generator
#[derive(Debug, Clone)]
pub struct CurseFile {
    project_id: u64,
    file_id: u64,
    name: String,
    stable: bool,
    date: DateTime<Utc>,
    game_versions: BTreeSet<String>,
}

/// Platform adapter for CurseForge
pub struct CursePlatform {
    client: reqwest::Client,
    base_url: String,
    maven_url: String,
}

impl CursePlatform {
    /// Creates a new CursePlatform with custom service and maven base URLs
    pub fn new(base_url: &str, maven_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("moddingx/updatejson")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            maven_url: maven_url.to_string(),
        }
    }

    /// CurseForge project ids are numeric; anything else is an input error
    fn parse_project_id(project_id: &str) -> Result<u64, PlatformError> {
        project_id
            .parse()
            .map_err(|_| PlatformError::InvalidProjectId(project_id.to_string()))
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, PlatformError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            warn!("Curse wrapper returned status {}: {}", status, url);
            return Err(PlatformError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl Default for CursePlatform {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MAVEN_URL)
    }
}

#[async_trait::async_trait]
impl ModPlatform for CursePlatform {
    type File = CurseFile;

    async fn project(&self, project_id: &str) -> Result<ProjectData, PlatformError> {
        let id = Self::parse_project_id(project_id)?;
        let url = format!("{}/project/{}", self.base_url, id);
        let project: CurseProjectResponse = self.get(&url, &[]).await?.json().await.map_err(|e| {
            warn!("Failed to parse curse project response: {}", e);
            PlatformError::InvalidResponse(e.to_string())
        })?;

        Ok(ProjectData {
            slug: project.slug,
            homepage: project.website,
        })
    }

    async fn list_files(
        &self,
        project_id: &str,
        loaders: &[ModLoader],
    ) -> Result<Vec<CurseFile>, PlatformError> {
        let id = Self::parse_project_id(project_id)?;
        let url = format!("{}/project/{}/files", self.base_url, id);
        let query: Vec<(&str, &str)> = loaders
            .iter()
            .map(|loader| ("loader", loader.as_str()))
            .collect();
        let listing: Vec<CurseFileResponse> =
            self.get(&url, &query).await?.json().await.map_err(|e| {
                warn!("Failed to parse curse file listing: {}", e);
                PlatformError::InvalidResponse(e.to_string())
            })?;

        listing
            .into_iter()
            .map(|entry| {
                let date = DateTime::parse_from_rfc3339(&entry.file_date)
                    .map_err(|e| {
                        PlatformError::InvalidResponse(format!(
                            "bad fileDate '{}': {}",
                            entry.file_date, e
                        ))
                    })?
                    .with_timezone(&Utc);
                Ok(CurseFile {
                    project_id: entry.project_id,
                    file_id: entry.file_id,
                    name: entry.name,
                    stable: entry.release_type.eq_ignore_ascii_case("release"),
                    date,
                    game_versions: entry.game_versions.into_iter().collect(),
                })
            })
            .collect()
    }

    fn key(&self, file: &CurseFile) -> FileKey {
        FileKey::new(file.project_id.to_string(), file.file_id.to_string())
    }

    fn file_name<'a>(&self, file: &'a CurseFile) -> &'a str {
        &file.name
    }

    fn is_stable(&self, file: &CurseFile) -> bool {
        file.stable
    }

    fn game_versions<'a>(&self, file: &'a CurseFile) -> &'a BTreeSet<String> {
        &file.game_versions
    }

    fn file_date(&self, file: &CurseFile) -> DateTime<Utc> {
        file.date
    }

    async fn changelog(&self, file: &CurseFile) -> Result<String, PlatformError> {
        let url = format!(
            "{}/project/{}/files/{}/changelog",
            self.base_url, file.project_id, file.file_id
        );
        Ok(self.get(&url, &[]).await?.text().await?)
    }

    fn version(&self, file: &CurseFile) -> ResolvableVersion {
        ResolvableVersion::FromArchive(format!(
            "{}/curse/maven/O-{}/{}/O-{}-{}.jar",
            self.maven_url, file.project_id, file.file_id, file.project_id, file.file_id
        ))
    }
}
