//! Structured URL representation used by [`RequestBuilder`](super::RequestBuilder).
//!
//! Unlike [`url::Url`], [`UrlComponents`] can describe a *relative* reference
//! (a bare path plus query items) that is only resolved against a base URL
//! when the request is finalized.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::{Position, Url};

/// Escaped in paths given to [`UrlComponents::from_path`], so `?`, `#` and
/// `%` are literal path characters.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escaped in query item names and values.  Spaces become `%20`.
const QUERY: &AsciiSet = &PATH.add(b'&').add(b'=').add(b'+');

/// One `name=value` pair of a query string.  A `None` value serializes as a
/// bare `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryItem {
    pub name: String,
    pub value: Option<String>,
}

impl QueryItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn key_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for QueryItem {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// Scheme, authority, path, query items and fragment of a URL reference.
/// Every part except the path is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlComponents {
    scheme: Option<String>,
    /// `user:pass@host:port`, without the leading `//`.
    authority: Option<String>,
    percent_encoded_path: String,
    query_items: Vec<QueryItem>,
    fragment: Option<String>,
}

impl UrlComponents {
    /// Components holding only `path`, taken literally: URL delimiters in it
    /// are percent-encoded rather than parsed.
    pub fn from_path(path: impl AsRef<str>) -> Self {
        Self {
            percent_encoded_path: utf8_percent_encode(path.as_ref(), PATH).to_string(),
            ..Self::default()
        }
    }

    /// Decompose an absolute URL.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;

        let authority = url
            .has_host()
            .then(|| url[Position::BeforeUsername..Position::AfterPort].to_string());

        let query_items = url.query().map(parse_query).unwrap_or_default();

        Ok(Self {
            scheme: Some(url.scheme().to_string()),
            authority,
            percent_encoded_path: url.path().to_string(),
            query_items,
            fragment: url.fragment().map(str::to_string),
        })
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// The decoded path.
    pub fn path(&self) -> Cow<'_, str> {
        decode(&self.percent_encoded_path)
    }

    pub fn percent_encoded_path(&self) -> &str {
        &self.percent_encoded_path
    }

    pub fn query_items(&self) -> &[QueryItem] {
        &self.query_items
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub(crate) fn append_query_items(&mut self, items: impl IntoIterator<Item = QueryItem>) {
        self.query_items.extend(items);
    }

    /// The percent-encoded query string, or `None` when there are no items.
    /// Items without a value render as a bare name.
    pub fn encoded_query(&self) -> Option<String> {
        if self.query_items.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .query_items
            .iter()
            .map(|item| {
                let name = utf8_percent_encode(&item.name, QUERY);
                match &item.value {
                    Some(value) => format!("{name}={}", utf8_percent_encode(value, QUERY)),
                    None => name.to_string(),
                }
            })
            .collect();
        Some(pairs.join("&"))
    }

    /// Render the components as a URI reference string.
    pub fn to_reference(&self) -> String {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if let Some(authority) = &self.authority {
            out.push_str("//");
            out.push_str(authority);
        }
        let relative = self.scheme.is_none() && self.authority.is_none();
        let first_segment = self.percent_encoded_path.split('/').next().unwrap_or_default();
        if relative && first_segment.contains(':') {
            // Otherwise `v1:x` would parse as scheme `v1`.
            out.push_str("./");
        }
        out.push_str(&self.percent_encoded_path);
        if let Some(query) = self.encoded_query() {
            out.push('?');
            out.push_str(&query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    /// Resolve against `base` following RFC 3986 reference resolution.
    /// Absolute components ignore `base`.
    pub fn resolve(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&self.to_reference())
    }
}

/// Split a raw query on `&` and the first `=` of each pair.  A pair with no
/// `=` becomes a key-only item; `+` is kept literally.
fn parse_query(query: &str) -> Vec<QueryItem> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => QueryItem::new(decode(name), decode(value)),
            None => QueryItem::key_only(decode(pair)),
        })
        .collect()
}

fn decode(input: &str) -> Cow<'_, str> {
    percent_decode_str(input).decode_utf8_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn path_resolves_under_base_directory() {
        let c = UrlComponents::from_path("speech/recognition/conversation/cognitiveservices/v1");
        let url = c
            .resolve(&base("https://japaneast.stt.speech.microsoft.com"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://japaneast.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1"
        );
    }

    #[test]
    fn query_items_are_encoded_in_order() {
        let mut c = UrlComponents::from_path("search");
        c.append_query_items([QueryItem::new("q", "a&b"), QueryItem::key_only("flag")]);
        assert_eq!(c.encoded_query().as_deref(), Some("q=a%26b&flag"));
        assert_eq!(c.to_reference(), "search?q=a%26b&flag");
    }

    #[test]
    fn parse_decomposes_absolute_url() {
        let c = UrlComponents::parse("https://user@example.com:8443/a/b?x=1&y=two#frag").unwrap();
        assert_eq!(c.scheme(), Some("https"));
        assert_eq!(c.authority(), Some("user@example.com:8443"));
        assert_eq!(c.path(), "/a/b");
        assert_eq!(
            c.query_items(),
            [QueryItem::new("x", "1"), QueryItem::new("y", "two")]
        );
        assert_eq!(c.fragment(), Some("frag"));
    }

    #[test]
    fn absolute_components_ignore_base() {
        let c = UrlComponents::parse("https://other.example/v1").unwrap();
        let url = c.resolve(&base("https://h/")).unwrap();
        assert_eq!(url.as_str(), "https://other.example/v1");
    }

    #[test]
    fn parse_rejects_relative_input() {
        assert!(UrlComponents::parse("not a url").is_err());
    }

    #[test]
    fn empty_components_resolve_to_base() {
        let url = UrlComponents::default().resolve(&base("https://h/root/")).unwrap();
        assert_eq!(url.as_str(), "https://h/root/");
    }

    #[test]
    fn from_path_escapes_url_delimiters() {
        let c = UrlComponents::from_path("a b?c#d%e");
        assert_eq!(c.percent_encoded_path(), "a%20b%3Fc%23d%25e");
        assert_eq!(c.path(), "a b?c#d%e");
        assert_eq!(c.encoded_query(), None);
        assert_eq!(c.fragment(), None);
    }

    #[test]
    fn colon_in_first_segment_stays_relative() {
        let c = UrlComponents::from_path("v1:recognize");
        assert_eq!(c.to_reference(), "./v1:recognize");

        let url = c.resolve(&base("https://h/api/")).unwrap();
        assert_eq!(url.as_str(), "https://h/api/v1:recognize");

        let nested = UrlComponents::from_path("v1/items:batch");
        assert_eq!(nested.to_reference(), "v1/items:batch");
    }

    #[test]
    fn parse_keeps_key_only_items_and_decodes_values() {
        let c = UrlComponents::parse("https://h/a?flag&x=a%20b&y=1+2&&z=").unwrap();
        assert_eq!(
            c.query_items(),
            [
                QueryItem::key_only("flag"),
                QueryItem::new("x", "a b"),
                QueryItem::new("y", "1+2"),
                QueryItem::new("z", ""),
            ]
        );
        assert_eq!(c.encoded_query().as_deref(), Some("flag&x=a%20b&y=1%2B2&z="));
    }

    #[test]
    fn query_values_use_percent_twenty_for_spaces() {
        let mut c = UrlComponents::from_path("q");
        c.append_query_items([QueryItem::new("text", "a b=c")]);
        assert_eq!(c.to_reference(), "q?text=a%20b%3Dc");
    }
}
