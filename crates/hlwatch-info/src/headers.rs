//! Default request headers for the info API.
//!
//! Requests carry the same header set a browser sends when hyperdash.info
//! calls the info endpoint.

use crate::error::{InfoError, InfoResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Origin used for `Origin` / `Referer`.
pub const HYPERDASH_ORIGIN: &str = "https://hyperdash.info";

// Accept-Encoding is left to reqwest, which only advertises codecs it can decode.
const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "user-agent",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36",
    ),
    ("content-type", "application/json"),
    ("sec-ch-ua-platform", "\"Linux\""),
    (
        "sec-ch-ua",
        "\"Chromium\";v=\"134\", \"Not:A-Brand\";v=\"24\", \"Brave\";v=\"134\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-gpc", "1"),
    ("accept-language", "en-US,en;q=0.9"),
    ("origin", HYPERDASH_ORIGIN),
    ("sec-fetch-site", "cross-site"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-dest", "empty"),
    ("referer", "https://hyperdash.info/"),
];

/// Build the default header map.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(DEFAULT_HEADERS.len());
    for (name, value) in DEFAULT_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// Default headers with `overrides` added or replacing existing entries.
pub fn with_overrides(overrides: &[(&str, &str)]) -> InfoResult<HeaderMap> {
    let mut headers = default_headers();
    for (name, value) in overrides {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| InfoError::HttpClient(format!("Invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| InfoError::HttpClient(format!("Invalid header value for {name}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
