//! Attachment download
//!
//! Attachments referenced from issue text are fetched over HTTP. The GitHub
//! token is only attached when the URL points at the trusted host, so links
//! to third-party servers never see it.

use crate::config::{bearer_value, GitHubConfig, SecretString};
use crate::domain::{MirrorError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Downloads the bytes behind an attachment URL
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Fetch`] on transport failure or a non-2xx
    /// status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`AttachmentFetcher`] over reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    trusted_host: Option<Url>,
    token: Option<SecretString>,
    user_agent: String,
}

impl HttpFetcher {
    /// Creates a fetcher from the `[github]` configuration section
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let trusted_host = match Url::parse(&config.trusted_host) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    trusted_host = %config.trusted_host,
                    error = %e,
                    "Trusted host does not parse, attachments will be fetched anonymously"
                );
                None
            }
        };

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                MirrorError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            trusted_host,
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Whether requests to `url` may carry the token
    ///
    /// Scheme, host and port must all match the trusted host.
    pub fn is_trusted(&self, url: &Url) -> bool {
        self.trusted_host.as_ref().is_some_and(|trusted| {
            trusted.scheme() == url.scheme()
                && trusted.host_str() == url.host_str()
                && trusted.port_or_known_default() == url.port_or_known_default()
        })
    }
}

#[async_trait]
impl AttachmentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = Url::parse(url)
            .map_err(|e| MirrorError::Fetch(format!("Invalid attachment URL {url}: {e}")))?;

        let mut request = self
            .client
            .get(parsed.clone())
            .header(USER_AGENT, &self.user_agent);
        if let (true, Some(token)) = (self.is_trusted(&parsed), &self.token) {
            request = request.header(AUTHORIZATION, bearer_value(token));
        }

        let resp = request
            .send()
            .await
            .map_err(|e| MirrorError::Fetch(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MirrorError::Fetch(format!(
                "{url} returned status {status}"
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| MirrorError::Fetch(format!("{url}: failed to read body: {e}")))?;

        tracing::debug!(url = %url, size = bytes.len(), "Fetched attachment");
        Ok(bytes.to_vec())
    }
}
