//! HTTP client for the dataset fetch.
//!
//! A thin wrapper around reqwest that applies the crate's timeouts and user
//! agent, and turns non-success responses into [`FunderError::Fetch`].

use crate::config::NetworkConfig;
use crate::error::{FunderError, Result};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// HTTP client used by the dataset source.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a new HTTP client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| FunderError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self { client })
    }

    /// Make a GET request, failing on any non-success status.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FunderError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
                status: None,
            })?;

        Self::check_response_status(response, url)
    }

    /// Check if an HTTP status code indicates a retryable error.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
    }

    fn check_response_status(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            debug!(
                "GET {} -> {} ({:?} bytes)",
                url,
                status,
                response.content_length()
            );
            return Ok(response);
        }

        let retry_hint = if Self::is_retryable_status(status) {
            " (temporary, reload to retry)"
        } else {
            ""
        };
        Err(FunderError::Fetch {
            url: url.to_string(),
            message: format!("HTTP {}{}", status, retry_hint),
            status: Some(status.as_u16()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(HttpClient::is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!HttpClient::is_retryable_status(StatusCode::NOT_FOUND));
    }
}
