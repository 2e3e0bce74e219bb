//! Single-shot HTTP transport: one `POST /a2a/message` per call.

use crate::directory::domain::AgentEndpoint;
use crate::transport::domain::{A2aMessage, AgentCall, AgentReply};
use crate::transport::ports::channel::decode_reply;
use crate::transport::ports::{TransportChannel, TransportError, TransportResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const MESSAGE_PATH: &str = "/a2a/message";

/// Point-to-point channel backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpDirectChannel {
    client: reqwest::Client,
}

impl HttpDirectChannel {
    /// Creates a channel with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel sharing an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_request_error(endpoint: &AgentEndpoint, err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::timeout(endpoint, timeout)
    } else if err.is_decode() || err.is_body() {
        TransportError::malformed(endpoint, err)
    } else {
        TransportError::not_available(endpoint, err)
    }
}

#[async_trait]
impl TransportChannel for HttpDirectChannel {
    async fn invoke(
        &self,
        endpoint: &AgentEndpoint,
        call: &AgentCall,
        timeout: Duration,
    ) -> TransportResult<AgentReply> {
        if !endpoint.is_http() {
            return Err(TransportError::not_available(
                endpoint,
                "direct transport requires an http(s) endpoint",
            ));
        }

        let envelope = A2aMessage::request(call);
        let exchange = async {
            let response = self
                .client
                .post(endpoint.join(MESSAGE_PATH))
                .json(&envelope)
                .timeout(timeout)
                .send()
                .await
                .map_err(|err| map_request_error(endpoint, &err, timeout))?;

            let status = response.status();
            if status.is_server_error() || status == reqwest::StatusCode::NOT_FOUND {
                return Err(TransportError::not_available(
                    endpoint,
                    format!("agent answered HTTP {status}"),
                ));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|err| map_request_error(endpoint, &err, timeout))?;
            serde_json::from_slice::<Value>(&bytes)
                .map_err(|err| TransportError::malformed(endpoint, err))
        };

        let raw = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| TransportError::timeout(endpoint, timeout))??;
        decode_reply(endpoint, raw)
    }
}
