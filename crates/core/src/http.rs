//! Request and response model shared by the cache, the network and the worker.
//!
//! Bodies are held as [`Bytes`], so cloning a response to both return it and
//! store it never consumes the original.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::hash::compute_cache_key;

/// Response type as classified by the fetching layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    /// Cross-origin response that was readable.
    Cors,
    /// Network error placeholder.
    Error,
    /// Cross-origin response with hidden contents.
    Opaque,
    /// Redirect that was not followed.
    #[serde(rename = "opaqueredirect")]
    OpaqueRedirect,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Error => "error",
            ResponseType::Opaque => "opaque",
            ResponseType::OpaqueRedirect => "opaqueredirect",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(ResponseType::Basic),
            "cors" => Some(ResponseType::Cors),
            "error" => Some(ResponseType::Error),
            "opaque" => Some(ResponseType::Opaque),
            "opaqueredirect" => Some(ResponseType::OpaqueRedirect),
            _ => None,
        }
    }
}

/// An outgoing request from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased HTTP method.
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: impl AsRef<str>, url: Url) -> Self {
        Self { method: method.as_ref().to_ascii_uppercase(), url, headers: Vec::new() }
    }

    /// Shorthand for a header-less GET.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Whether the `Accept` header asks for an HTML document.
    pub fn accepts_html(&self) -> bool {
        self.header("accept").is_some_and(|accept| accept.contains("text/html"))
    }

    /// The URL as it participates in cache identity: fragment dropped, query kept.
    pub fn cache_url(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.to_string()
    }

    /// Cache identity of this request. Headers (and `Vary`) are ignored.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, &self.cache_url())
    }
}

/// A response from the network or a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL the response was served from.
    pub url: String,
    pub status: u16,
    pub response_type: ResponseType,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    /// A same-origin (`basic`) response with no headers.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, response_type: ResponseType::Basic, headers: Vec::new(), body: body.into() }
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Status in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Eligible for opportunistic caching: exactly 200 and same-origin.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }
}
