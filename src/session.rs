//! Load and save sequencing between the local cache, the remote endpoint
//! and the bundled default.

use log::{info, warn};
use serde_json::Value;
use sitekeep_common::{DocumentError, MissingField, SiteDocument};
use std::fmt;
use thiserror::Error;

use crate::bundled_document;
use crate::cache::{CacheError, LocalCache};
use crate::remote::RemoteSite;
use crate::settings::{ApiSettings, SettingsUpdate};

pub const SETTINGS_SAVED: &str = "API settings saved.";
pub const RESET_DONE: &str = "Reset to default data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    Cache,
    Remote,
    Bundled,
    Imported,
}

impl DocumentSource {
    pub fn message(self) -> &'static str {
        match self {
            DocumentSource::Cache => "Loaded from local cache.",
            DocumentSource::Remote => "Loaded from API.",
            DocumentSource::Bundled => "API unavailable. Loaded bundled default data.",
            DocumentSource::Imported => "JSON imported successfully.",
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Published,
    CachedOnlyMissingKey,
    CachedOnlyUnreachable,
}

impl SaveOutcome {
    pub fn message(self) -> &'static str {
        match self {
            SaveOutcome::Published => "Saved to API and local cache.",
            SaveOutcome::CachedOnlyMissingKey => "Saved locally. API key missing.",
            SaveOutcome::CachedOnlyUnreachable => "Saved locally. API not reachable.",
        }
    }

    pub fn is_published(self) -> bool {
        self == SaveOutcome::Published
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Brand name, phone, email, and address are required.")]
    InvalidLocalInput(MissingField),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON file.")]
    InvalidJson,
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// The document being edited, where it came from, and the settings used
/// to publish it.
#[derive(Debug, Clone)]
pub struct EditorSession {
    document: SiteDocument,
    source: DocumentSource,
    settings: ApiSettings,
    dirty: bool,
}

impl EditorSession {
    pub fn new(document: SiteDocument, source: DocumentSource, settings: ApiSettings) -> Self {
        Self {
            document: document.normalized(),
            source,
            settings,
            dirty: false,
        }
    }

    pub fn document(&self) -> &SiteDocument {
        &self.document
    }

    pub fn source(&self) -> DocumentSource {
        self.source
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// True once an edit has been made that no save has covered yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_text(&mut self, path: &str, value: &str) -> Result<(), DocumentError> {
        self.document.set_text(path, value)?;
        self.dirty = true;
        Ok(())
    }

    /// Appends a blank item to the list at `path`; returns its index.
    pub fn add_item(&mut self, path: &str) -> Result<usize, DocumentError> {
        let index = self.document.add_item(path)?;
        self.dirty = true;
        Ok(index)
    }

    pub fn remove_item(&mut self, path: &str, index: usize) -> Result<(), DocumentError> {
        self.document.remove_item(path, index)?;
        self.dirty = true;
        Ok(())
    }

    pub fn move_item(&mut self, path: &str, from: usize, to: usize) -> Result<(), DocumentError> {
        self.document.move_item(path, from, to)?;
        self.dirty = true;
        Ok(())
    }

    /// Two-space indented JSON of the current document.
    pub fn export(&self) -> serde_json::Result<String> {
        self.document.to_pretty_json()
    }
}

/// Reconciles an [`EditorSession`] with the cache and a remote endpoint.
pub struct SiteSync<R> {
    remote: R,
    cache: LocalCache,
}

impl<R: RemoteSite> SiteSync<R> {
    pub fn new(remote: R, cache: LocalCache) -> Self {
        Self { remote, cache }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Cache first, then the remote endpoint, then the bundled document.
    /// Whatever wins is normalized.
    pub async fn load(&self) -> EditorSession {
        let settings = self.cache.settings().await;

        if let Some(document) = self.cache.document().await {
            info!("Using cached site document from {}", self.cache.dir().display());
            return EditorSession::new(document, DocumentSource::Cache, settings);
        }

        match self.remote.fetch(&settings).await {
            Ok(document) => {
                info!("Fetched site document from {}", settings.endpoint());
                EditorSession::new(document, DocumentSource::Remote, settings)
            }
            Err(e) => {
                warn!("Falling back to bundled site document: {e}");
                EditorSession::new(bundled_document(), DocumentSource::Bundled, settings)
            }
        }
    }

    /// Publishes when a key is configured, then caches no matter what the
    /// remote said.
    ///
    /// Takes the session mutably so one session cannot run two saves at
    /// once.
    pub async fn save(&self, session: &mut EditorSession) -> Result<SaveOutcome, SaveError> {
        session
            .document
            .check_required_fields()
            .map_err(SaveError::InvalidLocalInput)?;

        let outcome = if session.settings.credential().is_none() {
            SaveOutcome::CachedOnlyMissingKey
        } else {
            match self.remote.publish(&session.settings, &session.document).await {
                Ok(()) => SaveOutcome::Published,
                Err(e) => {
                    warn!("Publishing to {} failed: {e}", session.settings.endpoint());
                    SaveOutcome::CachedOnlyUnreachable
                }
            }
        };

        self.cache.store_document(&session.document).await?;
        session.dirty = false;
        info!("{}", outcome.message());
        Ok(outcome)
    }

    /// Replaces the session document with `text` when it holds a JSON
    /// object. Anything else leaves the session as it was.
    pub async fn import(&self, session: &mut EditorSession, text: &str) -> Result<(), ImportError> {
        let document = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|value| SiteDocument::from_value(value).ok())
            .ok_or(ImportError::InvalidJson)?
            .normalized();

        session.document = document;
        session.source = DocumentSource::Imported;
        session.dirty = false;
        self.cache.store_document(&session.document).await?;
        Ok(())
    }

    /// Drops the cached document and starts over from the bundled one.
    pub async fn reset(&self, session: &mut EditorSession) -> Result<(), CacheError> {
        self.cache.clear_document().await?;
        session.document = bundled_document().normalized();
        session.source = DocumentSource::Bundled;
        session.dirty = false;
        Ok(())
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<ApiSettings, CacheError> {
        let mut settings = self.cache.settings().await;
        settings.apply(update);
        self.cache.store_settings(&settings).await?;
        Ok(settings)
    }
}
