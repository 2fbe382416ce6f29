//! HTTP transport seam.
//!
//! [`Transport`] executes a finalized [`Request`] and returns the raw
//! response body.  [`ReqwestTransport`] is the production implementation;
//! tests substitute their own.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::request::Request;

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Executes requests.  Implementors must be `Send + Sync` so a client can be
/// shared across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Bytes, TransportError>;
}

// ---------------------------------------------------------------------------
// ReqwestTransport
// ---------------------------------------------------------------------------

/// [`Transport`] backed by a shared `reqwest::Client`.
///
/// The per-request timeout comes from [`Request::timeout`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Bytes, TransportError> {
        let wire = request.to_reqwest();

        log::debug!("{} {}", request.method, request.url);
        let response = self.client.execute(wire).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reports_code_and_body() {
        let err = TransportError::Status {
            status: 401,
            body: "denied".into(),
        };
        assert_eq!(err.to_string(), "server returned HTTP 401: denied");
    }

    #[test]
    fn transport_is_object_safe() {
        let _: Box<dyn Transport> = Box::new(ReqwestTransport::new());
    }
}
