use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde_json::Value;
use sitekeep_common::{API_KEY_HEADER, SiteDocument};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::settings::ApiSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} did not return a site document")]
    Malformed { url: String },
    #[error("could not encode site document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The document endpoint as seen from the admin client.
pub trait RemoteSite {
    /// Read operation.
    fn fetch(
        &self,
        settings: &ApiSettings,
    ) -> impl Future<Output = Result<SiteDocument, RemoteError>> + Send;

    /// Replace operation.
    fn publish(
        &self,
        settings: &ApiSettings,
        document: &SiteDocument,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpRemote {
    fn default() -> Self {
        Self::new()
    }
}

fn transport(url: &str) -> impl FnOnce(reqwest::Error) -> RemoteError + '_ {
    move |source| RemoteError::Transport {
        url: url.to_string(),
        source,
    }
}

impl RemoteSite for HttpRemote {
    async fn fetch(&self, settings: &ApiSettings) -> Result<SiteDocument, RemoteError> {
        let url = settings.endpoint();
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(transport(url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(transport(url))?;
        serde_json::from_slice::<Value>(&bytes)
            .ok()
            .and_then(|value| SiteDocument::from_value(value).ok())
            .ok_or_else(|| RemoteError::Malformed {
                url: url.to_string(),
            })
    }

    async fn publish(
        &self,
        settings: &ApiSettings,
        document: &SiteDocument,
    ) -> Result<(), RemoteError> {
        let key = settings.credential().ok_or(RemoteError::MissingCredential)?;
        let url = settings.endpoint();
        let body = document.to_json()?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, key)
            .body(body)
            .send()
            .await
            .map_err(transport(url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(())
    }
}
