use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use sitekeep::session::{RESET_DONE, SETTINGS_SAVED};
use sitekeep::{
    EditorSession, HttpRemote, LocalCache, RemoteSite, SaveError, SettingsUpdate, SiteSync,
};

/// Edit, publish and back up the site content document.
#[derive(Parser)]
#[command(name = "sitekeep", version)]
struct Cli {
    /// Directory holding the local document and settings cache.
    #[arg(long, global = true, env = "SITEKEEP_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the document and report where it came from.
    Load,
    /// Write the current document as indented JSON.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the current document with a JSON file.
    Import { file: PathBuf },
    /// Apply edits, then publish and cache the document.
    Save {
        /// Text field edit as `dotted.path=value`. Repeatable.
        #[arg(long = "set", value_parser = parse_assignment)]
        edits: Vec<(String, String)>,
    },
    /// Append a blank item to a list such as `services` or
    /// `projects.0.stack`, then save.
    Add { list: String },
    /// Remove the item at `index` from a list, then save.
    Remove { list: String, index: usize },
    /// Move a list item from one position to another, then save.
    Move {
        list: String,
        from: usize,
        to: usize,
    },
    /// Forget the cached document and go back to the bundled default.
    Reset,
    /// Update the endpoint URL or API key.
    Settings {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(path, value)| (path.trim().to_string(), value.to_string()))
        .filter(|(path, _)| !path.is_empty())
        .ok_or_else(|| format!("expected path=value, got `{raw}`"))
}

async fn save<R: RemoteSite>(sync: &SiteSync<R>, session: &mut EditorSession) -> Result<()> {
    match sync.save(session).await {
        Ok(outcome) => {
            println!("{}", outcome.message());
            Ok(())
        }
        Err(e @ SaveError::InvalidLocalInput(_)) => bail!("{e}"),
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("sitekeep=info"))
        .init();

    let cli = Cli::parse();
    let cache_dir = match cli.cache_dir {
        Some(dir) => dir,
        None => LocalCache::default_dir().context("No per-user data directory available")?,
    };
    info!("Using cache directory {}", cache_dir.display());
    let sync = SiteSync::new(HttpRemote::new(), LocalCache::new(cache_dir));

    match cli.command {
        Command::Load => {
            let session = sync.load().await;
            println!("{}", session.source().message());
        }
        Command::Export { out } => {
            let session = sync.load().await;
            let json = session.export()?;
            match out {
                Some(path) => tokio::fs::write(&path, format!("{json}\n"))
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut session = sync.load().await;
            sync.import(&mut session, &text).await?;
            println!("{}", session.source().message());
        }
        Command::Save { edits } => {
            let mut session = sync.load().await;
            for (path, value) in &edits {
                session
                    .set_text(path, value)
                    .map_err(|e| anyhow!("Cannot set {path}: {e}"))?;
            }
            save(&sync, &mut session).await?;
        }
        Command::Add { list } => {
            let mut session = sync.load().await;
            let index = session
                .add_item(&list)
                .map_err(|e| anyhow!("Cannot add to {list}: {e}"))?;
            println!("Added {list}.{index}.");
            save(&sync, &mut session).await?;
        }
        Command::Remove { list, index } => {
            let mut session = sync.load().await;
            session
                .remove_item(&list, index)
                .map_err(|e| anyhow!("Cannot remove from {list}: {e}"))?;
            save(&sync, &mut session).await?;
        }
        Command::Move { list, from, to } => {
            let mut session = sync.load().await;
            session
                .move_item(&list, from, to)
                .map_err(|e| anyhow!("Cannot reorder {list}: {e}"))?;
            save(&sync, &mut session).await?;
        }
        Command::Reset => {
            let mut session = sync.load().await;
            sync.reset(&mut session).await?;
            println!("{RESET_DONE}");
        }
        Command::Settings { api_url, api_key } => {
            let settings = sync
                .update_settings(SettingsUpdate { api_url, api_key })
                .await?;
            println!("{SETTINGS_SAVED}");
            info!("Endpoint is now {}", settings.endpoint());
        }
    }
    Ok(())
}
