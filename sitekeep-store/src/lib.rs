pub mod atomic;
pub mod repository;

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Component, Path, PathBuf};

pub use atomic::write_atomic;
pub use repository::SiteRepository;

const DATA_DIR: &str = "data";
const DOCUMENT_FILE: &str = "site.json";

/// Where the document lives.
///
/// A configured absolute path is used as-is, a relative one is joined onto
/// `content_root`. Without configuration the document sits in `data/` next
/// to the content root. Nothing is touched on disk.
pub fn resolve_document_path(configured: Option<&str>, content_root: &Path) -> PathBuf {
    match configured.map(str::trim).filter(|path| !path.is_empty()) {
        None => normalize_lexically(
            &content_root
                .join(Component::ParentDir)
                .join(DATA_DIR)
                .join(DOCUMENT_FILE),
        ),
        Some(path) if Path::new(path).is_absolute() => PathBuf::from(path),
        Some(path) => normalize_lexically(&content_root.join(path)),
    }
}

/// Folds `.` and `..` without consulting the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    out
}

/// Resolves the destination without touching anything on disk.
///
/// Safe to call while a server is writing to the same path.
pub fn open_store(configured: Option<&str>, content_root: &Path) -> SiteRepository {
    let path = resolve_document_path(configured, content_root);
    info!("Site document path: {}", path.display());
    SiteRepository::new(path)
}

/// Server startup: resolves the destination and clears temp files a crashed
/// writer left behind. Only call this before any writer is running.
pub fn initialize_store(configured: Option<&str>, content_root: &Path) -> Result<SiteRepository> {
    let repository = open_store(configured, content_root);
    let removed = repository
        .remove_stale_temp_files()
        .context("Failed to clear stale temp files")?;
    if removed > 0 {
        warn!("Removed {removed} stale temp file(s).");
    }
    Ok(repository)
}
