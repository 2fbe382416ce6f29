//! The finished request value produced by
//! [`RequestBuilder::finalize`](super::RequestBuilder::finalize).

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use url::Url;

use crate::request::method::HttpMethod;

/// Timeout of a fresh request before any timeout step runs.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A fully materialized request, ready to hand to a transport.
///
/// Plain data: two requests finalized from the same builder and base compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub timeout: Duration,
}

impl Request {
    /// A `GET` request for `url` with no headers, no body and the default
    /// timeout.
    pub fn new(url: Url) -> Self {
        Self {
            method: HttpMethod::default(),
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Length of the body in bytes, `0` when there is none.
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }

    /// Every value of header `name`, in the order they were added.  Values
    /// that are not visible ASCII are left out.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// First value of header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Convert into a `reqwest::Request`.
    pub fn to_reqwest(&self) -> reqwest::Request {
        let mut wire = reqwest::Request::new(self.method.into(), self.url.clone());
        *wire.headers_mut() = self.headers.clone();
        *wire.timeout_mut() = Some(self.timeout);
        if let Some(body) = &self.body {
            *wire.body_mut() = Some(body.clone().into());
        }
        wire
    }
}
