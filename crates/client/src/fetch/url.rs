//! Turning tool input into request URLs.

use url::Url;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for UrlError {
    fn from(err: url::ParseError) -> Self {
        UrlError::InvalidUrl(err.to_string())
    }
}

/// Resolve `input` into a request URL.
///
/// Root-relative paths (`/js/main.js`) are joined onto `origin`. Anything else
/// must be an absolute http(s) URL; a bare host gets `https://`. The host is
/// lowercased, the query kept as written and the fragment dropped.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = if input.starts_with('/') && !input.starts_with("//") {
        origin.join(input)?
    } else if input.contains("://") {
        Url::parse(input)?
    } else {
        Url::parse(&format!("https://{input}"))?
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }
    url.set_fragment(None);
    Ok(url)
}
