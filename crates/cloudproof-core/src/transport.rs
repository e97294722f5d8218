//! The network seam used by the verifier.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::TransportError;

/// Sends one HTTP request and returns the full response.
///
/// Implementations must not retry and must not add headers that take part in
/// the SigV4 signature.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send `request` and buffer the response body.
    async fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, TransportError>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a transport with reqwest's default client settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the TLS backend cannot be initialized.
    pub fn try_default() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Build a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, TransportError> {
        let (parts, body) = request.into_parts();
        let url = reqwest::Url::parse(&parts.uri.to_string())
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {e}", parts.uri)))?;

        debug!(method = %parts.method, %url, "sending request");

        let response = self
            .client
            .request(parts.method, url)
            .headers(parts.headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(%status, body_len = body.len(), "received response");

        let mut result = http::Response::new(body);
        *result.status_mut() = status;
        *result.headers_mut() = headers;
        Ok(result)
    }
}
