use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use sitekeep_common::validate_payload;
use sitekeep_store::open_store;

/// Installs a site document file into the server's store.
#[derive(Parser)]
#[command(name = "sitekeep-seed")]
struct Args {
    /// JSON document to install.
    source: PathBuf,
    /// Document path override, same meaning as for the server.
    #[arg(long, env = "SITE_JSON_PATH")]
    json_path: Option<String>,
    /// Root that relative paths resolve against.
    #[arg(long, env = "SITE_CONTENT_ROOT")]
    content_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let content_root = match args.content_root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to read working directory")?,
    };

    let body = tokio::fs::read(&args.source)
        .await
        .with_context(|| format!("Failed to read {}", args.source.display()))?;
    if let Err(e) = validate_payload(&body) {
        error!("Refusing {}: {e}", args.source.display());
        bail!("{e}");
    }

    let repository = open_store(args.json_path.as_deref(), &content_root);
    repository.replace(&body).await?;
    info!(
        "Installed {} as {}",
        args.source.display(),
        repository.path().display()
    );
    Ok(())
}
