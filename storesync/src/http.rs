//! HTTP client abstraction for testability.

use crate::error::ProtocolError;
use std::future::Future;
use tracing::{debug, trace, warn};

/// Trait for the HTTP operations the engine performs.
///
/// This abstraction allows dependency injection of mock clients in tests;
/// production code uses [`ReqwestClient`].
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures and
    /// non-success status codes.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send;

    /// Performs an HTTP POST with a JSON body.
    fn post_json(
        &self,
        url: &str,
        body: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send;

    /// Performs an HTTP POST with a SOAP envelope body
    /// (`Content-Type: application/soap+xml`).
    fn post_soap(
        &self,
        url: &str,
        body: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send;
}

/// HTTP client implementation using reqwest.
///
/// All requests share one connection pool; the engine's calls are
/// independent and carry no session affinity beyond the token embedded
/// in request bodies.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the given request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProtocolError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProtocolError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Vec<u8>, ProtocolError> {
        let response = match request.send().await {
            Ok(resp) => {
                debug!(url, status = resp.status().as_u16(), "HTTP response received");
                resp
            }
            Err(e) => {
                warn!(
                    url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(ProtocolError::Http(format!("Request failed: {e}")));
            }
        };

        if !response.status().is_success() {
            warn!(url, status = response.status().as_u16(), "HTTP error status");
            return Err(ProtocolError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to read response body");
                Err(ProtocolError::Http(format!("Failed to read response: {e}")))
            }
        }
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProtocolError> {
        trace!(url, "HTTP GET request starting");
        self.send(self.client.get(url), url).await
    }

    async fn post_json(&self, url: &str, body: &str) -> Result<Vec<u8>, ProtocolError> {
        trace!(url, "HTTP POST (json) request starting");
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string());
        self.send(request, url).await
    }

    async fn post_soap(&self, url: &str, body: &str) -> Result<Vec<u8>, ProtocolError> {
        trace!(url, "HTTP POST (soap) request starting");
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/soap+xml")
            .body(body.to_string());
        self.send(request, url).await
    }
}
