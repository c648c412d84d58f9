//! HTTP client for the monitor's web API.
//!
//! The monitor exposes two endpoints: `GET {endpoint}/links` lists the
//! links it tracks, and `GET {endpoint}/links/{src}/{dst}` returns the
//! live status snapshot for one directed link. Responses are JSON; non-2xx
//! statuses and malformed bodies are fetch failures.
//!
//! ## Example
//!
//! ```rust,no_run
//! use linkwatch_client::MonitorApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = MonitorApi::builder()
//!         .endpoint("http://localhost:8000")
//!         .build();
//!
//!     for entry in api.links().await? {
//!         let status = api.link_status(&entry.id()).await?;
//!         println!("{}: {}", entry.id(), status.state);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use linkwatch_types::{LinkEntry, LinkId, LinkStatus};

use crate::error::FetchError;

/// Source of link status snapshots.
///
/// The watcher polls through this trait so alternative backends or test
/// fakes can stand in for the HTTP API.
#[async_trait]
pub trait StatusTransport: Send + Sync + fmt::Debug {
    /// Fetch the current status snapshot for one directed link.
    async fn fetch_status(&self, link: &LinkId) -> Result<LinkStatus, FetchError>;
}

/// HTTP client for a link monitor endpoint.
#[derive(Debug, Clone)]
pub struct MonitorApi {
    client: Client,
    endpoint: String,
}

impl MonitorApi {
    /// Create a new builder for configuring the client.
    pub fn builder() -> MonitorApiBuilder {
        MonitorApiBuilder::default()
    }

    /// List the links the monitor tracks.
    pub async fn links(&self) -> Result<Vec<LinkEntry>, FetchError> {
        self.get_json(format!("{}/links", self.endpoint)).await
    }

    /// Fetch the status snapshot for one directed link.
    pub async fn link_status(&self, link: &LinkId) -> Result<LinkStatus, FetchError> {
        self.get_json(format!("{}/links/{}/{}", self.endpoint, link.src, link.dst))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl StatusTransport for MonitorApi {
    async fn fetch_status(&self, link: &LinkId) -> Result<LinkStatus, FetchError> {
        self.link_status(link).await
    }
}

/// Builder for [`MonitorApi`].
#[derive(Debug, Default)]
pub struct MonitorApiBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl MonitorApiBuilder {
    /// Set the monitor endpoint (e.g., "http://localhost:8000").
    ///
    /// A trailing slash is stripped so path assembly stays predictable.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = Some(endpoint.trim_end_matches('/').to_string());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> MonitorApi {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        MonitorApi {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let api = MonitorApi::builder().build();
        assert_eq!(api.endpoint, "http://localhost:8000");
    }

    #[test]
    fn test_builder_custom() {
        let api = MonitorApi::builder()
            .endpoint("http://monitor.local:9000")
            .timeout(Duration::from_secs(3))
            .build();

        assert_eq!(api.endpoint, "http://monitor.local:9000");
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let api = MonitorApi::builder()
            .endpoint("http://monitor.local:9000/")
            .build();

        assert_eq!(api.endpoint, "http://monitor.local:9000");
    }
}
