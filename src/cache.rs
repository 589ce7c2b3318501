//! Local copies of the document and the API settings, one file each.

use directories::ProjectDirs;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sitekeep_common::SiteDocument;
use sitekeep_store::write_atomic;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::settings::ApiSettings;

pub const DOCUMENT_ENTRY: &str = "site-data.json";
pub const SETTINGS_ENTRY: &str = "api-settings.json";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache access failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user data directory for this tool, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "sitekeep", "sitekeep").map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Missing and unreadable entries both come back as `None`.
    async fn read_entry<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.entry_path(name);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {e}", path.display());
                None
            }
        }
    }

    async fn write_entry<T: Serialize>(&self, name: &str, value: &T) -> Result<(), CacheError> {
        let path = self.entry_path(name);
        let bytes = serde_json::to_vec(value)?;
        write_atomic(&path, &bytes)
            .await
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Wrote cache entry {}", path.display());
        Ok(())
    }

    async fn remove_entry(&self, name: &str) -> Result<(), CacheError> {
        let path = self.entry_path(name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    pub async fn document(&self) -> Option<SiteDocument> {
        self.read_entry(DOCUMENT_ENTRY).await
    }

    pub async fn store_document(&self, document: &SiteDocument) -> Result<(), CacheError> {
        self.write_entry(DOCUMENT_ENTRY, document).await
    }

    pub async fn clear_document(&self) -> Result<(), CacheError> {
        self.remove_entry(DOCUMENT_ENTRY).await
    }

    pub async fn settings(&self) -> ApiSettings {
        self.read_entry(SETTINGS_ENTRY).await.unwrap_or_default()
    }

    pub async fn store_settings(&self, settings: &ApiSettings) -> Result<(), CacheError> {
        self.write_entry(SETTINGS_ENTRY, settings).await
    }
}
