//! Typed header values used by the [`RequestBuilder`](super::RequestBuilder)
//! sugar methods.  Header names and the header map itself come from
//! [`reqwest::header`].

use std::borrow::Cow;
use std::fmt;

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// A MIME type used as the value of `Content-Type` or `Accept`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentType(Cow<'static, str>);

impl ContentType {
    pub const APPLICATION_JSON: ContentType = ContentType::from_static("application/json");
    pub const APPLICATION_OCTET_STREAM: ContentType =
        ContentType::from_static("application/octet-stream");
    pub const APPLICATION_XML: ContentType = ContentType::from_static("application/xml");
    pub const APPLICATION_ZIP: ContentType = ContentType::from_static("application/zip");
    pub const APPLICATION_FORM_URLENCODED: ContentType =
        ContentType::from_static("application/x-www-form-urlencoded");

    pub const IMAGE_GIF: ContentType = ContentType::from_static("image/gif");
    pub const IMAGE_JPEG: ContentType = ContentType::from_static("image/jpeg");
    pub const IMAGE_PNG: ContentType = ContentType::from_static("image/png");
    pub const IMAGE_TIFF: ContentType = ContentType::from_static("image/tiff");

    pub const TEXT_CSS: ContentType = ContentType::from_static("text/css");
    pub const TEXT_CSV: ContentType = ContentType::from_static("text/csv");
    pub const TEXT_HTML: ContentType = ContentType::from_static("text/html");
    pub const TEXT_PLAIN: ContentType = ContentType::from_static("text/plain");
    pub const TEXT_XML: ContentType = ContentType::from_static("text/xml");

    pub const VIDEO_MPEG: ContentType = ContentType::from_static("video/mpeg");
    pub const VIDEO_MP4: ContentType = ContentType::from_static("video/mp4");
    pub const VIDEO_QUICKTIME: ContentType = ContentType::from_static("video/quicktime");
    pub const VIDEO_WEBM: ContentType = ContentType::from_static("video/webm");

    /// 16 kHz PCM wrapped in a WAV container, as expected by the
    /// recognition endpoint.
    pub const AUDIO_WAV_PCM: ContentType =
        ContentType::from_static("audio/wav;codec=\"audio/pcm\"");

    pub const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    /// `multipart/form-data; boundary=<boundary>`
    pub fn multipart_form_data(boundary: &str) -> Self {
        Self::new(format!("multipart/form-data; boundary={boundary}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Values for `Content-Encoding` / `Accept-Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Gzip,
    Compress,
    Deflate,
    Br,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Compress => "compress",
            Encoding::Deflate => "deflate",
            Encoding::Br => "br",
        }
    }
}
