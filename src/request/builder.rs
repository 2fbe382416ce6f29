//! Immutable, composable request construction.
//!
//! A [`RequestBuilder`] holds [`UrlComponents`] plus an ordered list of
//! deferred [`BuildStep`]s.  Every transformation borrows the receiver and
//! returns a new builder, so one builder can serve as the base of several
//! diverging chains.  Nothing touches a [`Request`] until
//! [`RequestBuilder::finalize`] replays the steps, in registration order,
//! over a fresh request resolved against a base URL.
//!
//! ```
//! use speech_recognizer::request::{HttpMethod, RequestBuilder};
//! use url::Url;
//!
//! let base = Url::parse("https://h/").unwrap();
//! let request = RequestBuilder::from_path("x")
//!     .method(HttpMethod::Post)
//!     .header("A", "1")
//!     .header("A", "2")
//!     .finalize(&base);
//!
//! assert_eq!(request.url.as_str(), "https://h/x");
//! assert_eq!(request.method, HttpMethod::Post);
//! assert_eq!(request.header_values("A"), ["1", "2"]);
//! ```

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{
    HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE,
};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::request::components::{QueryItem, UrlComponents};
use crate::request::headers::{ContentType, Encoding};
use crate::request::method::HttpMethod;
use crate::request::prepared::Request;

// ---------------------------------------------------------------------------
// RequestError
// ---------------------------------------------------------------------------

/// Errors raised while registering builder steps.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A value could not be serialized into a request body.
    #[error("failed to encode request body: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Encoding(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// BodyEncoder
// ---------------------------------------------------------------------------

/// Turns one serializable value into body bytes.
pub trait BodyEncoder {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, RequestError>;
}

/// JSON encoder backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder {
    pub pretty: bool,
}

impl BodyEncoder for JsonEncoder {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, RequestError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// BuildStep
// ---------------------------------------------------------------------------

/// One deferred change to a request-in-progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// Add one value for a header; never replaces earlier values.  A name or
    /// value that is not valid on the wire is logged and skipped.
    Header { name: String, value: String },
    Method(HttpMethod),
    Body(Bytes),
    /// Set `Content-Length` to the length of the body present when this step
    /// runs, replacing any earlier value.
    ContentLength,
    Timeout(Duration),
}

impl BuildStep {
    /// Apply this step to `request`.
    pub fn apply(&self, request: &mut Request) {
        match self {
            BuildStep::Header { name, value } => {
                match (
                    HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    (Ok(name), Ok(value)) => {
                        request.headers.append(name, value);
                    }
                    _ => log::warn!("skipping invalid header {name:?}: {value:?}"),
                }
            }
            BuildStep::Method(method) => request.method = *method,
            BuildStep::Body(body) => request.body = Some(body.clone()),
            BuildStep::ContentLength => {
                let len = request.body_len();
                request.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
            }
            BuildStep::Timeout(timeout) => request.timeout = *timeout,
        }
    }
}

// ---------------------------------------------------------------------------
// RequestBuilder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct RequestBuilder {
    url_components: UrlComponents,
    steps: Vec<BuildStep>,
}

impl RequestBuilder {
    fn with_components(url_components: UrlComponents) -> Self {
        Self {
            url_components,
            steps: Vec::new(),
        }
    }

    /// A builder whose URL is only `path`, resolved later against a base.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::with_components(UrlComponents::from_path(path.into()))
    }

    /// A builder for an absolute URL.
    ///
    /// If `url` cannot be decomposed a warning is logged and an empty builder
    /// is returned; finalizing it yields the base URL.
    pub fn from_url(url: &str) -> Self {
        match UrlComponents::parse(url) {
            Ok(components) => Self::with_components(components),
            Err(e) => {
                log::warn!("cannot decompose URL {url:?} ({e}); using empty builder");
                Self::default()
            }
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::from_path(path).method(HttpMethod::Get)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::from_path(path).method(HttpMethod::Post)
    }

    pub fn json_get(path: impl Into<String>) -> Self {
        Self::get(path).content_type(ContentType::APPLICATION_JSON)
    }

    /// `POST` with an already encoded JSON body.
    pub fn json_post(path: impl Into<String>, json: impl Into<Bytes>) -> Self {
        Self::post(path)
            .content_type(ContentType::APPLICATION_JSON)
            .body(json, false)
    }

    /// `POST` with `value` encoded by the default [`JsonEncoder`].
    pub fn json_post_value<T: Serialize + ?Sized>(
        path: impl Into<String>,
        value: &T,
    ) -> Result<Self, RequestError> {
        Self::post(path)
            .content_type(ContentType::APPLICATION_JSON)
            .json_body(value)
    }

    pub fn url_components(&self) -> &UrlComponents {
        &self.url_components
    }

    /// Registered steps in execution order.
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    // -- URL ----------------------------------------------------------------

    /// Append query items after any existing ones.
    pub fn query_items<I, Q>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<QueryItem>,
    {
        let mut next = self.clone();
        next.url_components
            .append_query_items(items.into_iter().map(Into::into));
        next
    }

    pub fn query_item(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_items([QueryItem::new(name, value)])
    }

    // -- Steps --------------------------------------------------------------

    /// Register an arbitrary step after the existing ones.
    pub fn step(&self, step: BuildStep) -> Self {
        let mut next = self.clone();
        next.steps.push(step);
        next
    }

    /// Add one header value.  Repeated names accumulate values.
    pub fn header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.step(BuildStep::Header {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Add several values for one header, in order.
    pub fn header_values<I, V>(&self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        values
            .into_iter()
            .fold(self.clone(), |builder, value| builder.header(name, value))
    }

    pub fn method(&self, method: HttpMethod) -> Self {
        self.step(BuildStep::Method(method))
    }

    /// Set the body.  With `with_content_length` a `Content-Length` step is
    /// registered right after the body step.
    pub fn body(&self, body: impl Into<Bytes>, with_content_length: bool) -> Self {
        let next = self.step(BuildStep::Body(body.into()));
        if with_content_length {
            next.step(BuildStep::ContentLength)
        } else {
            next
        }
    }

    pub fn json_body<T: Serialize + ?Sized>(&self, value: &T) -> Result<Self, RequestError> {
        self.json_body_with(value, &JsonEncoder::default())
    }

    pub fn json_body_with<T, E>(&self, value: &T, encoder: &E) -> Result<Self, RequestError>
    where
        T: Serialize + ?Sized,
        E: BodyEncoder,
    {
        let bytes = encoder.encode(value)?;
        Ok(self.body(bytes, false))
    }

    pub fn timeout(&self, timeout: Duration) -> Self {
        self.step(BuildStep::Timeout(timeout))
    }

    // -- Header sugar -------------------------------------------------------

    pub fn content_length(&self, length: usize) -> Self {
        self.header(CONTENT_LENGTH.as_str(), length.to_string())
    }

    pub fn content_type(&self, content_type: ContentType) -> Self {
        self.header(CONTENT_TYPE.as_str(), content_type.as_str())
    }

    pub fn accept(&self, content_type: ContentType) -> Self {
        self.header(ACCEPT.as_str(), content_type.as_str())
    }

    pub fn content_encoding(&self, encoding: Encoding) -> Self {
        self.header(CONTENT_ENCODING.as_str(), encoding.as_str())
    }

    pub fn accept_encoding(&self, encoding: Encoding) -> Self {
        self.header(ACCEPT_ENCODING.as_str(), encoding.as_str())
    }

    // -- Finalize -----------------------------------------------------------

    /// Materialize the request against `base`.
    ///
    /// The URL components are resolved relative to `base`; if that fails the
    /// base itself is used.  All steps then run, in order, on a fresh
    /// [`Request`].  Calling this repeatedly yields equal requests.
    pub fn finalize(&self, base: &Url) -> Request {
        let url = self.url_components.resolve(base).unwrap_or_else(|e| {
            log::warn!(
                "cannot resolve {:?} against {base} ({e}); using base URL",
                self.url_components.to_reference()
            );
            base.clone()
        });

        let mut request = Request::new(url);
        for step in &self.steps {
            step.apply(&mut request);
        }
        request
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
