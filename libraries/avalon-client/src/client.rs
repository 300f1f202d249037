//! Main Avalon client.

use crate::collections::CollectionClient;
use crate::error::{AvalonClientError, Result};
use crate::media_objects::MediaObjectClient;
use crate::supplemental::SupplementalFileClient;
use crate::types::ClientConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Client for one Avalon instance.
///
/// Every request carries the instance API key in the `Avalon-Api-Key`
/// header. Resource-specific operations live on the sub-clients returned
/// by [`collections`](Self::collections),
/// [`media_objects`](Self::media_objects) and
/// [`supplemental_files`](Self::supplemental_files).
///
/// # Example
///
/// ```ignore
/// use avalon_client::{AvalonClient, ClientConfig, Instance};
///
/// let config = ClientConfig::for_instance(Instance::Pre, std::env::var("AVALON_PRE")?);
/// let client = AvalonClient::new(config)?;
///
/// let items = client.collections().page_items("1c18df80p", 10, |_| {}).await?;
/// println!("Found {} media objects", items.len());
/// ```
pub struct AvalonClient {
    http: Client,
    config: ClientConfig,
}

impl AvalonClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(AvalonClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AvalonClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        if config.api_key.trim().is_empty() {
            return Err(AvalonClientError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("avalon-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AvalonClientError::Request)?;

        debug!(url = %url, timeout_secs = config.timeout_secs, "Created Avalon client");

        Ok(Self {
            http,
            config: ClientConfig { url, ..config },
        })
    }

    /// The normalized base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Collection listing and paging.
    pub fn collections(&self) -> CollectionClient<'_> {
        CollectionClient::new(&self.http, &self.config.url, &self.config.api_key)
    }

    /// Media object retrieval and updates.
    pub fn media_objects(&self) -> MediaObjectClient<'_> {
        MediaObjectClient::new(&self.http, &self.config.url, &self.config.api_key)
    }

    /// Supplemental files of one master file.
    pub fn supplemental_files<'a>(&'a self, master_file_id: &'a str) -> SupplementalFileClient<'a> {
        SupplementalFileClient::new(
            &self.http,
            &self.config.url,
            &self.config.api_key,
            master_file_id,
        )
    }
}
