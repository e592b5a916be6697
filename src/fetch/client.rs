//! HTTP client for downloading published CSV datasets.

use crate::utils::config::DEFAULT_HTTP_TIMEOUT;
use crate::utils::error::FetchError;
use log::{debug, info};
use reqwest::blocking::Client;

/// Blocking client for fetching remote datasets
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Create a new fetch client with the default timeout
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(FetchError::RequestFailed)?;

        Ok(Self { client })
    }

    /// Fetch a CSV document from a URL
    ///
    /// **Public** - main entry point for remote retrieval
    ///
    /// # Errors
    /// * `FetchError::RequestFailed` - Connection or timeout failure
    /// * `FetchError::BadStatus` - Non-success HTTP status
    /// * `FetchError::EmptyBody` - Success status but no content
    pub fn fetch_csv(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching dataset: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(FetchError::RequestFailed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().map_err(FetchError::RequestFailed)?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }

        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(body)
    }
}
