//! End-to-end pipeline tests against a mocked curse wrapper service
//!
//! Exercises the full generate path: project lookup, file listing,
//! artifact download, metadata extraction, changelog normalization, and
//! cache persistence across two runs.

use std::io::{Cursor, Write};

use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use updatejson::cache::FileCache;
use updatejson::generator::generate;
use updatejson::platform::{CursePlatform, ModLoader};
use updatejson::version::VersionResolver;

fn jar_with_mods_toml(version: &str) -> Vec<u8> {
    let toml = format!(
        "modLoader = \"javafml\"\n\n[[mods]]\nmodId = \"examplemod\"\nversion = \"{version}\"\n"
    );
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("META-INF/mods.toml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(toml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

struct Mocks {
    project: Mock,
    files: Mock,
    good_jar: Mock,
    broken_jar: Mock,
    changelog: Mock,
}

/// One project with a resolvable release and a newer file whose artifact
/// download keeps failing
async fn mock_project(server: &mut ServerGuard) -> Mocks {
    let project = server
        .mock("GET", "/project/256717")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"slug": "examplemod", "website": "https://www.curseforge.com/minecraft/mc-mods/examplemod"}"#,
        )
        .expect(2)
        .create_async()
        .await;
    let files = server
        .mock("GET", "/project/256717/files?loader=forge")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{
                "projectId": 256717,
                "fileId": 4711,
                "name": "examplemod-1.2.3.jar",
                "releaseType": "release",
                "fileDate": "2024-01-01T00:00:00Z",
                "gameVersions": ["1.20.1"]
            }, {
                "projectId": 256717,
                "fileId": 4712,
                "name": "examplemod-next.jar",
                "releaseType": "beta",
                "fileDate": "2024-02-01T00:00:00Z",
                "gameVersions": ["1.20.1"]
            }]"#,
        )
        .expect(2)
        .create_async()
        .await;
    let good_jar = server
        .mock("GET", "/curse/maven/O-256717/4711/O-256717-4711.jar")
        .with_status(200)
        .with_body(jar_with_mods_toml("1.2.3"))
        .expect(1)
        .create_async()
        .await;
    let broken_jar = server
        .mock("GET", "/curse/maven/O-256717/4712/O-256717-4712.jar")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let changelog = server
        .mock("GET", "/project/256717/files/4711/changelog")
        .with_status(200)
        .with_body("<p>Fixed a <b>crash</b> on startup</p>")
        .expect(1)
        .create_async()
        .await;

    Mocks {
        project,
        files,
        good_jar,
        broken_jar,
        changelog,
    }
}

#[tokio::test]
async fn two_runs_share_the_cache_and_produce_identical_manifests() {
    let mut server = Server::new_async().await;
    let mocks = mock_project(&mut server).await;

    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("cache").join("curse.json");

    let platform = CursePlatform::new(&server.url(), &server.url());
    let resolver = VersionResolver::new();

    // First run starts cold and persists what it resolved
    let mut cache = FileCache::new();
    cache.load(&cache_path);
    let (slug, first) = generate(&platform, &resolver, &mut cache, "256717", &[ModLoader::Forge])
        .await
        .unwrap();
    cache.persist(&cache_path);

    assert_eq!(slug, "examplemod");
    assert_eq!(
        first.homepage,
        "https://www.curseforge.com/minecraft/mc-mods/examplemod"
    );
    // The newer beta never resolves, so both promotions fall back to the
    // resolvable release.
    assert_eq!(first.promos["1.20.1-recommended"], "1.2.3");
    assert_eq!(first.promos["1.20.1-latest"], "1.2.3");
    assert_eq!(first.releases["1.20.1"]["1.2.3"], "Fixed a crash on startup");

    // Second run reloads the persisted cache; downloads and the changelog
    // fetch must not repeat, including the failed artifact
    let mut cache = FileCache::new();
    cache.load(&cache_path);
    let (_, second) = generate(&platform, &resolver, &mut cache, "256717", &[ModLoader::Forge])
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string_pretty(&first).unwrap(),
        serde_json::to_string_pretty(&second).unwrap()
    );

    mocks.project.assert_async().await;
    mocks.files.assert_async().await;
    mocks.good_jar.assert_async().await;
    mocks.broken_jar.assert_async().await;
    mocks.changelog.assert_async().await;
}

#[tokio::test]
async fn manifest_json_has_the_update_checker_shape() {
    let mut server = Server::new_async().await;
    let _mocks = mock_project(&mut server).await;

    let platform = CursePlatform::new(&server.url(), &server.url());
    let resolver = VersionResolver::new();
    let mut cache = FileCache::new();

    let (_, manifest) = generate(&platform, &resolver, &mut cache, "256717", &[ModLoader::Forge])
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
    assert_eq!(
        json["homepage"],
        "https://www.curseforge.com/minecraft/mc-mods/examplemod"
    );
    assert_eq!(json["promos"]["1.20.1-recommended"], "1.2.3");
    assert_eq!(json["promos"]["1.20.1-latest"], "1.2.3");
    assert_eq!(json["1.20.1"]["1.2.3"], "Fixed a crash on startup");
}
