//! Immutable request construction.
//!
//! * [`RequestBuilder`]: URL components plus deferred [`BuildStep`]s,
//!   materialized by [`RequestBuilder::finalize`].
//! * [`Request`]: the finished request value handed to a transport.
//! * [`ContentType`] / [`Encoding`]: typed values for the header sugar.
//!   Headers themselves are a [`reqwest::header::HeaderMap`].
//! * [`UrlComponents`] / [`QueryItem`]: relative or absolute URL parts.
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use speech_recognizer::request::{ContentType, RequestBuilder};
//! use url::Url;
//!
//! let base = Url::parse("https://japaneast.stt.speech.microsoft.com").unwrap();
//! let wav = vec![0u8; 44];
//!
//! let request = RequestBuilder::post("speech/recognition/conversation/cognitiveservices/v1")
//!     .query_item("language", "ja-JP")
//!     .header("Ocp-Apim-Subscription-Key", "secret")
//!     .content_type(ContentType::AUDIO_WAV_PCM)
//!     .body(wav, true)
//!     .timeout(Duration::from_secs(30))
//!     .finalize(&base);
//!
//! assert_eq!(request.url.query(), Some("language=ja-JP"));
//! assert_eq!(request.header("Content-Length"), Some("44"));
//! ```

pub mod builder;
pub mod components;
pub mod headers;
pub mod method;
pub mod prepared;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use builder::{BodyEncoder, BuildStep, JsonEncoder, RequestBuilder, RequestError};
pub use components::{QueryItem, UrlComponents};
pub use headers::{ContentType, Encoding};
pub use method::HttpMethod;
pub use prepared::{Request, DEFAULT_TIMEOUT};
