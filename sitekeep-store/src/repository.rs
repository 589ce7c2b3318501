use anyhow::{Context, Result};
use glob::glob;
use log::{debug, info};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::atomic::{temp_glob, write_atomic};

/// File-backed home of the single site document.
///
/// Holds no lock: concurrent replaces race at the rename and the last one
/// wins, readers see either document in full.
#[derive(Debug, Clone)]
pub struct SiteRepository {
    path: PathBuf,
}

impl SiteRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored bytes exactly as written, or `None` before the first replace.
    pub async fn fetch(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    /// Atomically swaps the stored document for `body`, verbatim.
    pub async fn replace(&self, body: &[u8]) -> Result<()> {
        write_atomic(&self.path, body)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("Stored {} bytes at {}", body.len(), self.path.display());
        Ok(())
    }

    /// Deletes leftover `<name>.*.tmp` siblings. Returns how many went.
    pub fn remove_stale_temp_files(&self) -> Result<usize> {
        let pattern = temp_glob(&self.path)?;
        debug!("Scanning for stale temp files: {pattern}");

        let mut removed = 0;
        for path in glob(&pattern)?.filter_map(Result::ok) {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {path:?}"))?;
            removed += 1;
        }
        Ok(removed)
    }
}
