//! HTTP request methods understood by [`RequestBuilder`](super::RequestBuilder).

use std::fmt;

/// The request method applied by a [`BuildStep::Method`](super::BuildStep::Method) step.
///
/// A freshly finalized request uses [`HttpMethod::Get`] unless a method step
/// overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Head,
    Delete,
    Patch,
    Options,
    Connect,
    Trace,
}

impl HttpMethod {
    /// Upper-case wire name (`"GET"`, `"POST"`, …).
    ///
    /// ```
    /// use speech_recognizer::request::HttpMethod;
    ///
    /// assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Head => "HEAD",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Options => reqwest::Method::OPTIONS,
            HttpMethod::Connect => reqwest::Method::CONNECT,
            HttpMethod::Trace => reqwest::Method::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_get() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }

    #[test]
    fn converts_to_reqwest_method() {
        let m: reqwest::Method = HttpMethod::Options.into();
        assert_eq!(m, reqwest::Method::OPTIONS);
        assert_eq!(m.as_str(), HttpMethod::Options.as_str());
    }
}
