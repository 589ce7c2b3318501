//! Admin-side synchronization for the site document: a local cache, the
//! remote endpoint, and the default document shipped with the binary.

use log::error;
use sitekeep_common::SiteDocument;

pub mod cache;
pub mod remote;
pub mod session;
pub mod settings;

pub use cache::{CacheError, LocalCache};
pub use remote::{HttpRemote, RemoteError, RemoteSite};
pub use session::{
    DocumentSource, EditorSession, ImportError, SaveError, SaveOutcome, SiteSync,
};
pub use settings::{ApiSettings, SettingsUpdate};

const BUNDLED_DOCUMENT: &str = include_str!("../data/site.json");

/// The default document compiled into the binary, normalized.
pub fn bundled_document() -> SiteDocument {
    match serde_json::from_str::<SiteDocument>(BUNDLED_DOCUMENT) {
        Ok(document) => document.normalized(),
        Err(e) => {
            error!("Bundled site document is unusable: {e}");
            SiteDocument::default().normalized()
        }
    }
}
