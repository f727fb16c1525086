use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use updatejson::cache::FileCache;
use updatejson::config::{parse_project_list, PROJECT_RETRY_ATTEMPTS};
use updatejson::generator;
use updatejson::platform::{CursePlatform, ModLoader, ModPlatform, ModrinthPlatform, PlatformError};
use updatejson::version::VersionResolver;

#[derive(Parser)]
#[command(name = "updatejson", version)]
#[command(about = "Update checker manifest generator for mod hosting platforms")]
struct Cli {
    /// Modding platform to fetch the data from
    #[arg(short, long, value_enum)]
    platform: PlatformKind,

    /// File listing the project ids to generate update checkers for
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    dir: PathBuf,

    /// Cache file to use
    #[arg(short = 'f', long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Mod loaders to include files for
    #[arg(short, long, value_enum, default_values_t = vec![ModLoader::Forge])]
    loader: Vec<ModLoader>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformKind {
    Curse,
    Modrinth,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let content = fs::read_to_string(&cli.config)
        .with_context(|| format!("failed to read project list {}", cli.config.display()))?;
    let project_ids = parse_project_list(&content);

    fs::create_dir_all(&cli.dir)
        .with_context(|| format!("failed to create output directory {}", cli.dir.display()))?;

    let mut cache = FileCache::new();
    if let Some(path) = &cli.cache {
        cache.load(path);
    }

    match cli.platform {
        PlatformKind::Curse => {
            generate_all(&CursePlatform::default(), &mut cache, &cli, &project_ids).await?;
        }
        PlatformKind::Modrinth => {
            generate_all(&ModrinthPlatform::default(), &mut cache, &cli, &project_ids).await?;
        }
    }

    if let Some(path) = &cli.cache {
        cache.persist(path);
    }
    Ok(())
}

async fn generate_all<P: ModPlatform>(
    platform: &P,
    cache: &mut FileCache,
    cli: &Cli,
    project_ids: &[String],
) -> anyhow::Result<()> {
    let resolver = VersionResolver::new();
    for project_id in project_ids {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match generator::generate(platform, &resolver, cache, project_id, &cli.loader).await {
                Ok((slug, manifest)) => {
                    let path = cli.dir.join(format!("{slug}.json"));
                    let json = serde_json::to_string_pretty(&manifest)?;
                    fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Wrote {}", path.display());
                    break;
                }
                Err(PlatformError::InvalidProjectId(id)) => {
                    anyhow::bail!("invalid project id in {}: {}", cli.config.display(), id);
                }
                Err(e) if e.is_transient() && attempt < PROJECT_RETRY_ATTEMPTS => {
                    warn!(
                        "Transient failure for project {} (attempt {}): {}",
                        project_id, attempt, e
                    );
                }
                Err(e) => {
                    error!("Skipping project {}: {}", project_id, e);
                    break;
                }
            }
        }
    }
    Ok(())
}
