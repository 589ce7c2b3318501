use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub const DEFAULT_BIND: &str = "0.0.0.0:5205";

/// Startup settings. Read once; there is no runtime reconfiguration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Origins allowed cross-origin access. Empty disables CORS entirely.
    pub allowed_origins: Vec<String>,
    /// Write credential. Blank means every replace is refused.
    pub api_key: String,
    /// Document path override, absolute or relative to `content_root`.
    pub json_path: Option<String>,
    pub content_root: PathBuf,
    pub bind: SocketAddr,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let allowed_origins = lookup("SITE_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let content_root = match lookup("SITE_CONTENT_ROOT").filter(|v| !v.trim().is_empty()) {
            Some(root) => PathBuf::from(root),
            None => std::env::current_dir().context("Failed to read working directory")?,
        };

        let bind = lookup("SITE_BIND")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .trim()
            .parse()
            .with_context(|| format!("SITE_BIND is not a socket address: {bind}"))?;

        Ok(Self {
            allowed_origins,
            api_key: lookup("SITE_API_KEY").unwrap_or_default(),
            json_path: lookup("SITE_JSON_PATH").filter(|v| !v.trim().is_empty()),
            content_root,
            bind,
        })
    }

    pub fn writes_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Any method and header from the listed origins; `None` when no origin
    /// is configured.
    pub fn cors_layer(&self) -> Option<CorsLayer> {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring unusable CORS origin");
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            return None;
        }

        Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("allowed_origins", &self.allowed_origins)
            .field("api_key", &if self.writes_enabled() { "<set>" } else { "<unset>" })
            .field("json_path", &self.json_path)
            .field("content_root", &self.content_root)
            .field("bind", &self.bind)
            .finish()
    }
}
