//! HTTP client for a remote directory surface.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::directory::{
    domain::{AgentId, AgentRecord},
    ports::{AgentDirectory, AgentFilter, DirectoryLookupError, DirectoryLookupResult},
    services::RegisterAgentRequest,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Listing body returned by `GET /agents`.
#[derive(Debug, Deserialize)]
struct AgentListing {
    agents: Vec<AgentRecord>,
}

/// [`AgentDirectory`] implementation backed by the directory HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    base_url: String,
    client: Client,
}

impl HttpDirectoryClient {
    /// Creates a client for the directory at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryLookupError::Unreachable`] when the HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> DirectoryLookupResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(DirectoryLookupError::unreachable)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Registers (or re-registers) an agent with the remote directory.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryLookupError`] when the directory is unreachable or
    /// rejects the registration.
    pub async fn register(&self, request: &RegisterAgentRequest) -> DirectoryLookupResult<AgentRecord> {
        let response = self
            .client
            .post(self.url("/agents"))
            .json(request)
            .send()
            .await
            .map_err(DirectoryLookupError::unreachable)?;
        decode(response).await
    }

    /// Activates a registered agent on the remote directory.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryLookupError`] when the directory is unreachable or
    /// rejects the activation.
    pub async fn activate(&self, id: &AgentId) -> DirectoryLookupResult<AgentRecord> {
        let response = self
            .client
            .post(self.url(&format!("/agents/{id}/activate")))
            .send()
            .await
            .map_err(DirectoryLookupError::unreachable)?;
        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> DirectoryLookupResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DirectoryLookupError::InvalidResponse(format!(
            "status {status}: {body}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| DirectoryLookupError::InvalidResponse(err.to_string()))
}

#[async_trait]
impl AgentDirectory for HttpDirectoryClient {
    async fn list(&self, filter: &AgentFilter) -> DirectoryLookupResult<Vec<AgentRecord>> {
        let mut query: Vec<(&str, String)> = vec![("live_only", filter.live_only.to_string())];
        if let Some(capability) = &filter.capability {
            query.push(("capability", capability.to_string()));
        }

        let response = self
            .client
            .get(self.url("/agents"))
            .query(&query)
            .send()
            .await
            .map_err(DirectoryLookupError::unreachable)?;
        let listing: AgentListing = decode(response).await?;
        Ok(listing.agents)
    }

    async fn find(&self, id: &AgentId) -> DirectoryLookupResult<Option<AgentRecord>> {
        let response = self
            .client
            .get(self.url(&format!("/agents/{id}")))
            .send()
            .await
            .map_err(DirectoryLookupError::unreachable)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    async fn health(&self) -> DirectoryLookupResult<()> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(DirectoryLookupError::unreachable)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(DirectoryLookupError::InvalidResponse(format!(
                "health check returned {}",
                response.status()
            )))
        }
    }
}
